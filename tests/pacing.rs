//! Integration tests for outbound pacing through the bot facade.

mod common;

use common::{MockTransport, test_config};
use openbot::Bot;
use std::sync::Arc;
use std::time::Duration;

const WINDOW: Duration = Duration::from_secs(31);

async fn logged_in() -> (Bot, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    let bot = Bot::new(test_config(), transport.clone());
    bot.connect().await.unwrap();
    bot.join_channel("#chan").await.unwrap();
    bot.login("PaceBot", "token").await.unwrap();
    (bot, transport)
}

/// Largest number of sends falling inside any window-length interval.
fn max_in_any_window(times: &[tokio::time::Instant]) -> usize {
    times
        .iter()
        .map(|start| {
            times
                .iter()
                .filter(|t| **t >= *start && t.duration_since(*start) < WINDOW)
                .count()
        })
        .max()
        .unwrap_or(0)
}

#[tokio::test(start_paused = true)]
async fn test_sends_are_spaced_by_pace_delay() {
    let (bot, transport) = logged_in().await;
    for i in 0..5 {
        bot.send_command(format!("PRIVMSG #chan :{i}"));
    }

    tokio::time::sleep(Duration::from_secs(10)).await;

    let sent = transport.sent_with_prefix("PRIVMSG");
    assert_eq!(sent.len(), 5);
    for pair in sent.windows(2) {
        assert!(pair[1].0.duration_since(pair[0].0) >= Duration::from_millis(1550));
    }
    // Submission order is preserved.
    let bodies: Vec<_> = sent.iter().map(|(_, line)| line.as_str()).collect();
    assert_eq!(
        bodies,
        vec![
            "PRIVMSG #chan :0",
            "PRIVMSG #chan :1",
            "PRIVMSG #chan :2",
            "PRIVMSG #chan :3",
            "PRIVMSG #chan :4",
        ]
    );

    bot.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_normal_tier_holds_back_one_slot() {
    let (bot, transport) = logged_in().await;
    for i in 0..30 {
        bot.send_message(&format!("burst {i}"));
    }

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(transport.sent_with_prefix("PRIVMSG").len(), 19);
    assert_eq!(bot.outbox().pending(), 11);

    tokio::time::sleep(Duration::from_secs(40)).await;
    let times: Vec<_> = transport
        .sent_with_prefix("PRIVMSG")
        .into_iter()
        .map(|(at, _)| at)
        .collect();
    assert_eq!(times.len(), 30);
    assert!(max_in_any_window(&times) <= 19);

    bot.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_elevated_tier_uses_short_delay() {
    let (bot, transport) = logged_in().await;
    bot.dispatcher()
        .dispatch("@badges=moderator/1;mod=1 :tmi.twitch.tv USERSTATE #chan")
        .await
        .unwrap();
    assert_eq!(bot.limiter().limit(), 100);

    for i in 0..150 {
        bot.send_command(format!("PRIVMSG #chan :{i}"));
    }
    tokio::time::sleep(Duration::from_secs(5)).await;

    let sent = transport.sent_with_prefix("PRIVMSG");
    assert_eq!(sent.len(), 99);
    for pair in sent.windows(2) {
        let gap = pair[1].0.duration_since(pair[0].0);
        assert!(gap >= Duration::from_millis(2));
        assert!(gap < Duration::from_millis(100));
    }
    assert_eq!(bot.outbox().pending(), 51);

    bot.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_losing_moderator_does_not_evict_ledger() {
    let (bot, transport) = logged_in().await;
    bot.dispatcher()
        .dispatch("@mod=1 :tmi.twitch.tv USERSTATE #chan")
        .await
        .unwrap();
    for i in 0..40 {
        bot.send_command(format!("PRIVMSG #chan :{i}"));
    }
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(transport.sent_with_prefix("PRIVMSG").len(), 40);

    bot.dispatcher()
        .dispatch("@mod=0 :tmi.twitch.tv USERSTATE #chan")
        .await
        .unwrap();
    assert_eq!(bot.limiter().limit(), 20);

    bot.send_command("PRIVMSG #chan :late");
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(transport.sent_with_prefix("PRIVMSG").len(), 40);

    // Entries recorded at t=0 expire after the window.
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(transport.sent_with_prefix("PRIVMSG").len(), 41);

    bot.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_queue_survives_disconnect() {
    let (bot, transport) = logged_in().await;
    bot.disconnect().await;
    assert!(!bot.is_connected());

    bot.send_command("PRIVMSG #chan :a");
    bot.send_command("PRIVMSG #chan :b");
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(bot.outbox().pending(), 2);
    assert!(transport.sent_with_prefix("PRIVMSG").is_empty());

    bot.connect().await.unwrap();
    bot.login("PaceBot", "token").await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(
        transport.sent_lines(),
        vec!["PRIVMSG #chan :a", "PRIVMSG #chan :b"]
    );

    bot.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_send_failure_drops_command() {
    let (bot, transport) = logged_in().await;
    transport.fail_sends(true);
    bot.send_command("PRIVMSG #chan :lost");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(bot.outbox().pending(), 0);
    assert_eq!(bot.limiter().in_flight(), 1);

    transport.fail_sends(false);
    bot.send_command("PRIVMSG #chan :kept");
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(transport.sent_lines(), vec!["PRIVMSG #chan :kept"]);

    bot.disconnect().await;
}
