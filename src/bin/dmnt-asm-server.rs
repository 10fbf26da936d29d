//! Thin binary wrapping [`dmnt_asm::server::run`].
//!
//! No `clap` dependency here: the `server` feature doesn't pull it in,
//! since the original Flask app took its bind address from a single
//! positional-ish env var rather than a full flag set.

use std::env;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "dmnt_asm=info".to_string()))
        .init();

    let bind_addr = env::var("DMNT_ASM_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let indent: usize = env::var("DMNT_ASM_INDENT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4);

    if let Err(e) = dmnt_asm::server::run(&bind_addr, indent) {
        tracing::error!(error = %e, "server exited");
        std::process::exit(1);
    }
}
