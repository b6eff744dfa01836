use super::*;
use std::collections::HashMap;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |k| map.get(k).cloned()
}

#[test]
fn reads_prefixed_variables() {
    let cfg = SiteConfig::from_lookup(lookup(&[
        ("SCROLLYTE_DATASTORE_URL", "https://db.example.co"),
        ("SCROLLYTE_DATASTORE_KEY", "anon"),
        ("SCROLLYTE_CHAT_ENDPOINT", "https://chat.example.co/api"),
        ("SCROLLYTE_SITE_URL", "https://scrollyte.dev"),
    ]));
    assert_eq!(cfg.datastore().unwrap(), ("https://db.example.co", "anon"));
    assert_eq!(cfg.chat_endpoint.as_deref(), Some("https://chat.example.co/api"));
    assert_eq!(cfg.email_endpoint, None);
    assert_eq!(cfg.site_url, "https://scrollyte.dev");
}

#[test]
fn blank_values_are_unset() {
    let cfg = SiteConfig::from_lookup(lookup(&[
        ("SCROLLYTE_DATASTORE_URL", "https://db.example.co"),
        ("SCROLLYTE_DATASTORE_KEY", "   "),
        ("SCROLLYTE_SITE_URL", ""),
    ]));
    assert_eq!(cfg.datastore_key, None);
    assert_eq!(cfg.site_url, DEFAULT_SITE_URL);
    let err = cfg.datastore().unwrap_err();
    assert!(err.to_string().contains("SCROLLYTE_DATASTORE_KEY"));
}

#[test]
fn endpoints_build_http_clients() {
    let cfg = SiteConfig::from_lookup(lookup(&[
        ("SCROLLYTE_EMAIL_ENDPOINT", "https://mail.example.co/send"),
        ("SCROLLYTE_CHAT_ENDPOINT", "https://chat.example.co/api/"),
    ]));
    assert_eq!(cfg.mailer().unwrap().endpoint(), "https://mail.example.co/send");
    assert_eq!(cfg.completion_client().unwrap().endpoint(), "https://chat.example.co/api");

    let empty = SiteConfig::from_lookup(lookup(&[]));
    assert!(empty.mailer().unwrap_err().to_string().contains("SCROLLYTE_EMAIL_ENDPOINT"));
    assert!(
        empty
            .completion_client()
            .unwrap_err()
            .to_string()
            .contains("SCROLLYTE_CHAT_ENDPOINT")
    );
}
