#[cfg(feature = "smtp-sender")]
use std::{
    io::{BufRead, BufReader, Write},
    net::TcpListener,
    sync::mpsc,
    thread,
};

#[cfg(feature = "smtp-sender")]
use notimail_lib::{
    AddressList, Delivery, DeliveryOutcome, LocalHost, MailConfig, SenderBuilder, SmtpConfig,
};

/// Spawns a minimal SMTP server accepting a single email, and returns
/// its port with the channel receiving the email data.
#[cfg(feature = "smtp-sender")]
fn spawn_smtp_server() -> (u16, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut writer = stream;

        writer.write_all(b"220 localhost ESMTP\r\n").unwrap();

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).unwrap() == 0 {
                break;
            }

            let cmd = line.to_uppercase();
            if cmd.starts_with("DATA") {
                writer.write_all(b"354 end data with <CR><LF>.<CR><LF>\r\n").unwrap();

                let mut data = String::new();
                loop {
                    line.clear();
                    reader.read_line(&mut line).unwrap();
                    if line == ".\r\n" {
                        break;
                    }
                    data.push_str(&line);
                }

                writer.write_all(b"250 queued\r\n").unwrap();
                tx.send(data).unwrap();
            } else if cmd.starts_with("QUIT") {
                writer.write_all(b"221 bye\r\n").unwrap();
                break;
            } else {
                writer.write_all(b"250 ok\r\n").unwrap();
            }
        }
    });

    (port, rx)
}

#[cfg(feature = "smtp-sender")]
#[test]
fn test_smtp_sender() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (port, emails) = spawn_smtp_server();

    let config = MailConfig {
        from: Some("alice@localhost".into()),
        topic: Some("ci".into()),
        subject: "Plain message!".into(),
        smtp: SmtpConfig {
            host: "127.0.0.1".into(),
            port,
            ..SmtpConfig::default()
        },
        ..MailConfig::default()
    };
    let host = LocalHost::new("builder", "localhost", "127.0.0.1");
    let to: AddressList = ["bob@localhost"].into_iter().collect();
    let mut sender = SenderBuilder::build(&config).unwrap();

    let outcome = Delivery::new(&config, &host)
        .deliver(&to, "Plain message!", &mut *sender)
        .unwrap();
    assert!(matches!(outcome, DeliveryOutcome::Sent));

    let email = emails.recv().unwrap();
    assert!(email.contains("From: alice@localhost\r\n"));
    assert!(email.contains("To: bob@localhost\r\n"));
    assert!(email.contains("Subject: [ci] Plain message!\r\n"));
    assert!(email.contains("Precedence: bulk\r\n"));
    assert!(email.contains("X-Auto-Response-Suppress: OOF\r\n"));
    assert!(email.contains("Importance: low\r\n"));
    assert!(email.contains("Expires: "));
    assert!(email.contains("Sent via notimail from builder on localhost (127.0.0.1)"));
}

#[cfg(feature = "smtp-sender")]
#[test]
fn test_smtp_sender_unreachable() {
    let _ = env_logger::builder().is_test(true).try_init();

    // binds then drops the listener so that nothing listens on the port
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let config = MailConfig {
        fail_on_error: false,
        smtp: SmtpConfig {
            host: "127.0.0.1".into(),
            port,
            ..SmtpConfig::default()
        },
        ..MailConfig::default()
    };
    let host = LocalHost::new("builder", "localhost", "127.0.0.1");
    let to: AddressList = ["bob@localhost"].into_iter().collect();
    let mut sender = SenderBuilder::build(&config).unwrap();

    let outcome = Delivery::new(&config, &host)
        .deliver(&to, "Plain message!", &mut *sender)
        .unwrap();
    assert!(matches!(outcome, DeliveryOutcome::Failed(_)));
}
