use chrono::{Duration, Local};
use notimail_lib::{
    email::{format_mail_date, EXPIRES, EXPIRY_DATE, IMPORTANCE, PRECEDENCE},
    sender, AddressList, Delivery, DeliveryOutcome, Developer, Developers, LocalHost,
    MailConfig, MessageBody, OutgoingMessage, Sender,
};

#[derive(Debug, Default)]
struct SpySender {
    sent: Vec<OutgoingMessage>,
}

impl Sender for SpySender {
    fn send(&mut self, email: &OutgoingMessage) -> sender::Result<Vec<u8>> {
        self.sent.push(email.clone());
        Ok(email.to_readable().into_bytes())
    }
}

#[derive(Debug, Default)]
struct FailingSender {
    calls: usize,
}

impl Sender for FailingSender {
    fn send(&mut self, _email: &OutgoingMessage) -> sender::Result<Vec<u8>> {
        self.calls += 1;
        Err(sender::Error::SendEmailError("host unreachable".into()))
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn host() -> LocalHost {
    LocalHost::new("builder", "ci.localhost", "10.0.0.1")
}

fn dev0() -> AddressList {
    ["dev0@example.org"].into_iter().collect()
}

#[test]
fn test_empty_recipients_skips() {
    init_logger();

    let config = MailConfig::default();
    let host = host();
    let mut sender = SpySender::default();

    let outcome = Delivery::new(&config, &host)
        .deliver(&Developers::default(), "body", &mut sender)
        .unwrap();

    assert!(matches!(outcome, DeliveryOutcome::Skipped));
    assert!(sender.sent.is_empty());
}

#[test]
fn test_skip_config_skips() {
    init_logger();

    let config = MailConfig {
        skip: true,
        ..MailConfig::default()
    };
    let host = host();
    let mut sender = SpySender::default();

    // the missing body is never read
    let outcome = Delivery::new(&config, &host)
        .deliver(&dev0(), &MessageBody::default(), &mut sender)
        .unwrap();

    assert!(matches!(outcome, DeliveryOutcome::Skipped));
    assert!(sender.sent.is_empty());
}

#[test]
fn test_send_with_defaults() {
    init_logger();

    let config = MailConfig::default();
    let host = host();
    let mut sender = SpySender::default();

    let before = Local::now();
    let outcome = Delivery::new(&config, &host)
        .deliver(&dev0(), "Build succeeded.", &mut sender)
        .unwrap();

    assert!(matches!(outcome, DeliveryOutcome::Sent));
    assert_eq!(1, sender.sent.len());

    let email = &sender.sent[0];
    assert!(email.sent_at >= before);
    assert_eq!("builder@ci.localhost", email.sender.to_string());
    assert_eq!("dev0@example.org", email.recipients_to_string());
    assert_eq!("Automatic Email", email.subject);
    assert_eq!(Some("bulk"), email.headers.get(PRECEDENCE));
    assert_eq!(Some("low"), email.headers.get(IMPORTANCE));

    let expires = format_mail_date(&(email.sent_at + Duration::days(1)));
    assert_eq!(Some(expires.as_str()), email.headers.get(EXPIRES));
    assert_eq!(Some(expires.as_str()), email.headers.get(EXPIRY_DATE));
}

#[test]
fn test_send_to_developers() {
    init_logger();

    let config = MailConfig {
        from: Some("ci@example.org".into()),
        topic: Some("nightly".into()),
        subject: "Build broken".into(),
        priority: Some("high".into()),
        expires: Some("0".into()),
        ..MailConfig::default()
    };
    let host = host();
    let devs = Developers(vec![
        Developer {
            id: "id0".into(),
            email: Some("dev0@example.org".into()),
            name: Some("Zero".into()),
        },
        Developer {
            id: "id1".into(),
            email: None,
            name: None,
        },
        Developer {
            id: "id2".into(),
            email: Some("dev2@example.org".into()),
            name: None,
        },
    ]);
    let mut sender = SpySender::default();

    let outcome = Delivery::new(&config, &host)
        .deliver(&devs, "Tests failed.", &mut sender)
        .unwrap();

    assert!(matches!(outcome, DeliveryOutcome::Sent));
    let email = &sender.sent[0];
    assert_eq!("ci@example.org", email.sender.to_string());
    assert_eq!(
        "Zero <dev0@example.org>, dev2@example.org",
        email.recipients_to_string()
    );
    assert_eq!("[nightly] Build broken", email.subject);
    assert_eq!(Some("Urgent"), email.headers.get("Priority"));
    assert_eq!(None, email.headers.get(EXPIRES));
    assert!(email.body.starts_with("Tests failed.\r\n\r\n-- \r\nSent via notimail"));
}

#[test]
fn test_invalid_from_falls_back_to_default() {
    init_logger();

    let config = MailConfig {
        from: Some("not-an-address".into()),
        ..MailConfig::default()
    };
    let host = host();
    let mut sender = SpySender::default();

    let outcome = Delivery::new(&config, &host)
        .deliver(&dev0(), "body", &mut sender)
        .unwrap();

    assert!(matches!(outcome, DeliveryOutcome::Sent));
    assert_eq!("builder@ci.localhost", sender.sent[0].sender.to_string());
}

#[test]
fn test_dry_run_does_not_send() {
    init_logger();

    let config = MailConfig {
        dry_run: true,
        ..MailConfig::default()
    };
    let host = host();
    let mut sender = SpySender::default();

    let outcome = Delivery::new(&config, &host)
        .deliver(&dev0(), "body", &mut sender)
        .unwrap();

    match outcome {
        DeliveryOutcome::DryRun(readable) => {
            assert!(readable.contains("To: dev0@example.org\n"));
            assert!(readable.contains("Precedence: bulk\n"));
        }
        outcome => panic!("unexpected outcome {:?}", outcome),
    }
    assert!(sender.sent.is_empty());
}

#[test]
fn test_transport_failure_fails_by_default() {
    init_logger();

    let config = MailConfig::default();
    let host = host();
    let mut sender = FailingSender::default();

    let res = Delivery::new(&config, &host).deliver(&dev0(), "body", &mut sender);

    assert!(matches!(
        res,
        Err(notimail_lib::delivery::Error::SendEmailError(_, _))
    ));
    assert_eq!(1, sender.calls);
}

#[test]
fn test_transport_failure_ignored_without_fail_on_error() {
    init_logger();

    let config = MailConfig {
        fail_on_error: false,
        ..MailConfig::default()
    };
    let host = host();
    let mut sender = FailingSender::default();

    let outcome = Delivery::new(&config, &host)
        .deliver(&dev0(), "body", &mut sender)
        .unwrap();

    assert!(matches!(outcome, DeliveryOutcome::Failed(_)));
    assert_eq!(1, sender.calls);
}

#[test]
fn test_validation_errors_follow_fail_on_error() {
    init_logger();

    let host = host();
    let invalid_to: AddressList = ["@example.org"].into_iter().collect();
    let mut sender = SpySender::default();

    let config = MailConfig::default();
    let delivery = Delivery::new(&config, &host);
    assert!(delivery
        .deliver(&invalid_to, "body", &mut sender)
        .is_err());
    assert!(delivery
        .deliver(&dev0(), &MessageBody::default(), &mut sender)
        .is_err());

    let config = MailConfig {
        fail_on_error: false,
        ..MailConfig::default()
    };
    let delivery = Delivery::new(&config, &host);
    assert!(matches!(
        delivery.deliver(&invalid_to, "body", &mut sender),
        Ok(DeliveryOutcome::Failed(_))
    ));
    assert!(matches!(
        delivery.deliver(&dev0(), &MessageBody::default(), &mut sender),
        Ok(DeliveryOutcome::Failed(_))
    ));
    assert!(sender.sent.is_empty());
}

#[test]
fn test_default_sender_failure_is_always_fatal() {
    init_logger();

    let config = MailConfig {
        fail_on_error: false,
        ..MailConfig::default()
    };
    let host = LocalHost::new("", "ci.localhost", "10.0.0.1");
    let mut sender = SpySender::default();

    let res = Delivery::new(&config, &host).deliver(&dev0(), "body", &mut sender);

    match res {
        Err(err) => assert!(err.is_fatal()),
        Ok(outcome) => panic!("unexpected outcome {:?}", outcome),
    }
    assert!(sender.sent.is_empty());
}
