// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use nusic_referral_query::{unix_now, utc_day_start, SqliteStore, StoreConfig};
use nusic_referral_server::{build_router, ApiConfig, AppState};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const ONE_TOKEN: &str = "1000000000000000000000";
pub const FIXED_DAY: i64 = 1_699_920_000;

pub struct Fixture {
    pub dir: TempDir,
    pub addr: std::net::SocketAddr,
    pub state: AppState,
}

/// Referral graph A -> B (funded), A -> C, B -> D (funded) in team 0, plus a
/// team 7 edge and a dated leaderboard set.
pub fn seed_fixture(db: &Path) {
    let conn = Connection::open(db).expect("open sqlite");
    conn.execute_batch(
        "CREATE TABLE referrals(referer TEXT, referee TEXT, amount TEXT, rate TEXT, funded INTEGER, team INTEGER, createAt INTEGER);
         CREATE TABLE nft_owners(chainId INTEGER, nftAddress TEXT, owner TEXT, tokenId TEXT);
         INSERT INTO nft_owners VALUES (1, '0xNFT', '0xOwner', '42');
         INSERT INTO nft_owners VALUES (1, '0xnft', '0xowner', '43');
         INSERT INTO nft_owners VALUES (2, '0xnft', '0xowner', '44');",
    )
    .expect("schema");
    let today = utc_day_start(unix_now());
    let rows: [(&str, &str, &str, i64, i64, i64); 7] = [
        ("A", "B", ONE_TOKEN, 1, 0, today),
        ("A", "C", ONE_TOKEN, 0, 0, today),
        ("B", "D", ONE_TOKEN, 1, 0, today),
        ("A", "X", ONE_TOKEN, 0, 7, today),
        ("old1", "o1", "4000000000000000000000", 0, 0, FIXED_DAY + 10),
        ("old2", "o2", ONE_TOKEN, 0, 0, FIXED_DAY + 20),
        ("old2", "o3", ONE_TOKEN, 0, 0, FIXED_DAY + 30),
    ];
    for (referer, referee, amount, funded, team, created) in rows {
        conn.execute(
            "INSERT INTO referrals VALUES (?1, ?2, ?3, '500', ?4, ?5, ?6)",
            params![referer, referee, amount, funded, team, created],
        )
        .expect("insert referral");
    }
}

pub async fn spawn_server(api: ApiConfig) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("referral.sqlite");
    seed_fixture(&db);
    let images = dir.path().join("images");
    std::fs::create_dir_all(&images).expect("images dir");
    std::fs::write(images.join("1.jpg"), b"\xFF\xD8\xFFjpeg").expect("image");

    let store = SqliteStore::open(StoreConfig {
        db_path: db,
        ..StoreConfig::default()
    })
    .await
    .expect("open store");
    let api = ApiConfig {
        images_dir: images,
        ..api
    };
    let state = AppState::new(Arc::new(store), api);
    let app = build_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Fixture { dir, addr, state }
}

pub async fn send_raw(
    addr: std::net::SocketAddr,
    path: &str,
    headers: &[(&str, &str)],
) -> (u16, String, String) {
    send_raw_with_method(addr, "GET", path, headers, None).await
}

pub async fn post_json(addr: std::net::SocketAddr, path: &str, body: &str) -> (u16, String, serde_json::Value) {
    let (status, head, body) = send_raw_with_method(addr, "POST", path, &[], Some(body)).await;
    let json = serde_json::from_str(&body).expect("json body");
    (status, head, json)
}

pub async fn send_raw_with_method(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(payload) = body {
        req.push_str("Content-Type: application/json\r\n");
        req.push_str(&format!("Content-Length: {}\r\n", payload.len()));
    }
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    req.push_str("\r\n");
    if let Some(payload) = body {
        req.push_str(payload);
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut raw = Vec::new();
    stream
        .read_to_end(&mut raw)
        .await
        .expect("read response");
    let response = String::from_utf8_lossy(&raw).into_owned();
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, head.to_string(), body.to_string())
}

pub fn header_value<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
    })
}
