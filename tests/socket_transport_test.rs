#![cfg(feature = "socket")]

use futures_util::SinkExt;
use meterstream::config::{Config, TransportKind};
use meterstream::{ConnectionState, Session};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

fn socket_config(port: u16) -> Config {
    let mut config = Config::default();
    config.transport.kind = TransportKind::Socket;
    config.transport.host = "127.0.0.1".to_string();
    config.transport.port = port;
    config.transport.reconnect_delay_ms = 10;
    config
}

/// Accepts one connection per script, sends its frames, then hangs up
async fn serve(listener: TcpListener, scripts: Vec<Vec<&'static str>>) {
    for frames in scripts {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut ws) = accept_async(stream).await else {
            return;
        };
        for frame in frames {
            if ws.send(Message::text(frame)).await.is_err() {
                return;
            }
        }
        let _ = ws.close(None).await;
    }
    // keep the last connection target alive but silent
    std::future::pending::<()>().await;
}

#[tokio::test]
async fn frames_are_applied_and_bad_frames_dropped() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(serve(
        listener,
        vec![vec![
            r#"{"DeviceId":"m1","IEC61850":"VoltageL1","Value":"230.1"}"#,
            "this is not json",
            r#"{"DeviceId":"m1","IEC61850":"VoltageL2","Value":null}"#,
            r#"{"Meters":[{"Device":"m1","Online":true,"Type":"SDM"}]}"#,
        ]],
    ));

    let mut session = Session::new(&socket_config(port)).unwrap();
    let mut snapshots = session.subscribe();
    let shutdown = session.shutdown_handle();
    let task = tokio::spawn(async move {
        session.run().await;
        session
    });

    let snapshot = snapshots
        .wait_for(|s| s.statuses.contains_key("m1"))
        .await
        .unwrap()
        .clone();
    shutdown.shutdown();
    let session = task.await.unwrap();
    server.abort();

    let readings = &snapshot.readings["m1"];
    assert_eq!(readings.numeric("VoltageL1"), 230.1);
    assert!(readings.get("VoltageL2").is_none());
    assert_eq!(snapshot.statuses["m1"].status(), Some("online"));
    assert_eq!(snapshot.message, "Received m1 / VoltageL2: 0");
    assert_eq!(session.dashboard().connection(), ConnectionState::Closed);
}

#[tokio::test]
async fn peer_close_reconnects_and_keeps_state() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(serve(
        listener,
        vec![
            vec![r#"{"DeviceId":"m1","IEC61850":"PowerL1","Value":100}"#],
            vec![r#"{"DeviceId":"m1","IEC61850":"PowerL2","Value":50}"#],
        ],
    ));

    let mut session = Session::new(&socket_config(port)).unwrap();
    let mut snapshots = session.subscribe();
    let shutdown = session.shutdown_handle();
    let task = tokio::spawn(async move {
        session.run().await;
        session
    });

    let snapshot = snapshots
        .wait_for(|s| {
            s.readings
                .get("m1")
                .is_some_and(|r| r.presence("PowerL1") && r.presence("PowerL2"))
        })
        .await
        .unwrap()
        .clone();
    shutdown.shutdown();
    let session = task.await.unwrap();
    server.abort();

    assert!(session.attempts() >= 2);
    let rows = snapshot.rows("m1");
    let (row, power) = &rows[0];
    assert_eq!(row.base, "Power");
    assert_eq!(power.total_display.as_deref(), Some("150.00"));
}

#[tokio::test]
async fn refused_connection_surfaces_error_and_retries() {
    // bind then drop to get a port nobody listens on
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut session = Session::new(&socket_config(port)).unwrap();
    let mut snapshots = session.subscribe();
    let shutdown = session.shutdown_handle();
    let task = tokio::spawn(async move {
        session.run().await;
        session
    });

    snapshots
        .wait_for(|s| s.message == "Error retrieving updates")
        .await
        .unwrap();
    shutdown.shutdown();
    let session = task.await.unwrap();
    assert!(session.attempts() >= 1);
    assert!(session.dashboard().readings().is_empty());
}
