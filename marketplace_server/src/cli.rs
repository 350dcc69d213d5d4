use std::{env, env::VarError};

use marketplace_engine::db_types::Role;

use crate::{
    auth::{JwtClaims, TokenIssuer},
    config::AuthConfig,
};

/// Handles the few commands the server binary understands. Returns `true` if a command was handled and the process
/// should exit instead of starting the server.
pub fn handle_command_line_args() -> bool {
    let args = env::args().skip(1).collect::<Vec<String>>();
    match args.first().map(String::as_str) {
        None => false,
        Some("issue-token") => {
            issue_token(&args[1..]);
            true
        },
        Some(_) => {
            display_readme();
            display_envs();
            true
        },
    }
}

fn issue_token(args: &[String]) {
    let [user, role] = args else {
        eprintln!("Usage: marketplace_server issue-token <user-id> <role>");
        return;
    };
    let role = match role.parse::<Role>() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}. Valid roles are customer, seller, admin and agent.");
            return;
        },
    };
    let config = match AuthConfig::try_from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}\nA token signed with a throwaway secret is useless. Set MKT_JWT_SECRET first.");
            return;
        },
    };
    let claims = JwtClaims::new(user.as_str(), role);
    match TokenIssuer::new(&config).issue_token(claims) {
        Ok(token) => {
            println!("----------------------------- Access Token -----------------------------");
            println!("user: {user}");
            println!("role: {role}");
            println!("valid for: {} hours", config.token_lifetime.num_hours());
            println!("token:\n{token}");
            println!("------------------------------------------------------------------------");
        },
        Err(e) => eprintln!("{e}"),
    }
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 11] = [
        "RUST_LOG",
        "MKT_HOST",
        "MKT_PORT",
        "MKT_DATABASE_URL",
        "MKT_DB_MAX_CONNECTIONS",
        "MKT_TOKEN_LIFETIME_HOURS",
        "MKT_SHIPPING_FEE_CENTS",
        "MKT_TAX_RATE_BPS",
        "MKT_SELLER_INACTIVITY_DAYS",
        "MKT_SELLER_REACTIVATION_FEE_CENTS",
        "MKT_SELLER_LOCK_INTERVAL_SECS",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
