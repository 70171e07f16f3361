#![cfg(test)]

use std::time::Duration;

use oracle_koala::base::{
    config::{Config, ConfigInner},
    phrases::LIVENESS_MESSAGE,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

// Helpers.

fn free_local_addr() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

async fn get_root(addr: &str) -> Option<String> {
    let mut stream = TcpStream::connect(addr).await.ok()?;
    stream.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").await.ok()?;

    let mut response = String::new();
    stream.read_to_string(&mut response).await.ok()?;

    Some(response)
}

async fn wait_for_root(addr: &str) -> Option<String> {
    for _ in 0..50 {
        if let Some(response) = get_root(addr).await {
            return Some(response);
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    None
}

// Tests.

#[tokio::test]
async fn test_liveness_outlives_a_failed_discord_login() {
    let addr = free_local_addr();
    let config = Config::from(ConfigInner {
        token: "bogus-token".to_string(),
        liveness_bind: addr.clone(),
        ..Default::default()
    });

    let bot = tokio::spawn(oracle_koala::start(config));

    // Up while the login is attempted.
    let response = wait_for_root(&addr).await.expect("liveness endpoint never came up");
    assert!(response.starts_with("HTTP/1.1 200 OK"));
    assert!(response.ends_with(LIVENESS_MESSAGE));

    // Still up once the login has had time to fail.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(!bot.is_finished());

    let response = get_root(&addr).await.expect("liveness endpoint went away");
    assert!(response.starts_with("HTTP/1.1 200 OK"));

    bot.abort();
}

#[tokio::test]
async fn test_taken_liveness_port_fails_startup() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let config = Config::from(ConfigInner {
        token: "bogus-token".to_string(),
        liveness_bind: taken.local_addr().unwrap().to_string(),
        ..Default::default()
    });

    let result = tokio::time::timeout(Duration::from_secs(5), oracle_koala::start(config)).await;

    assert!(matches!(result, Ok(Err(_))));
}
