use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 11] = [
        "RUST_LOG",
        "SPG_HOST",
        "SPG_PORT",
        "SPG_DATABASE_URL",
        "SPG_MAX_DB_CONNECTIONS",
        "SPG_BANK_CODE",
        "SPG_ACCOUNT_NUMBER",
        "SPG_ACCOUNT_NAME",
        "SPG_PRODUCT_NAME",
        "SPG_AMOUNT_TOLERANCE",
        "SPG_POLL_INTERVAL_MS",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    });
    let api_key = if env::var("SPG_SEPAY_API_KEY").is_ok_and(|s| !s.trim().is_empty()) { "****" } else { "Not set" };
    println!("  {:<35} {api_key:<15}", "SPG_SEPAY_API_KEY");
}
