use std::{env, env::VarError};

/// Settings that are echoed back verbatim.
const PLAIN_ENVS: [&str; 10] = [
    "RUST_LOG",
    "KPG_HOST",
    "KPG_PORT",
    "KPG_DATABASE_URL",
    "KPG_DB_MAX_CONNECTIONS",
    "KPG_RUN_MIGRATIONS",
    "KPG_DEFAULT_CURRENCY",
    "KPG_GATEWAY_URL",
    "KPG_WEBHOOK_SIGNATURE_HEADER",
    "KPG_GATEWAY_TIMEOUT_SECS",
];

/// Gateway credentials. Only whether they are set is reported.
const SECRET_ENVS: [&str; 3] = ["KPG_GATEWAY_KEY_ID", "KPG_GATEWAY_KEY_SECRET", "KPG_WEBHOOK_SECRET"];

/// The payment server is configured entirely from the environment. Any argument prints the help text and the
/// current settings, and the caller should exit.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        const README: &str = include_str!("./cli-help.txt");
        println!("\n{README}\n");
        print_settings();
    }
    has_cli_args
}

fn print_settings() {
    println!("Current settings:");
    PLAIN_ENVS.iter().for_each(|&name| println!("  {name:<35} {}", describe_setting(name, env::var(name), false)));
    SECRET_ENVS.iter().for_each(|&name| println!("  {name:<35} {}", describe_setting(name, env::var(name), true)));
}

fn describe_setting(name: &str, value: Result<String, VarError>, secret: bool) -> String {
    match value {
        Ok(s) if secret && s.is_empty() => "Empty".into(),
        Ok(_) if secret => "Set (hidden)".into(),
        Ok(s) => s,
        Err(VarError::NotPresent) => "Not set".into(),
        Err(VarError::NotUnicode(_)) if secret => format!("{name} is not valid unicode"),
        Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
    }
}
