use embed_messaging::url::{
    build_embed_url, performance_url, serialize_query, PerformanceParams, QueryValue,
    PERFORMANCE_PAGE_PATH,
};
use embed_messaging::{EmbedOrigin, Protocol};

#[test]
fn drops_empty_and_absent_entries_and_joins_lists() {
    let query = serialize_query(vec![
        ("a", Some(QueryValue::Text("1".into()))),
        ("b", Some(QueryValue::Text(String::new()))),
        ("c", None),
        ("d", Some(QueryValue::List(vec!["x".into(), "y".into()]))),
    ]);
    assert_eq!(query, "a=1&d=x%2Cy");
}

#[test]
fn empty_lists_are_dropped() {
    let query = serialize_query(vec![
        ("refs", Some(QueryValue::List(Vec::new()))),
        ("token", Some(QueryValue::Text("tok".into()))),
    ]);
    assert_eq!(query, "token=tok");
}

#[test]
fn values_are_form_encoded() {
    let query = serialize_query(vec![("q", Some(QueryValue::Text("a b&c".into())))]);
    assert_eq!(query, "q=a+b%26c");
}

#[test]
fn embed_url_has_origin_path_and_query() {
    let origin = EmbedOrigin::new("embed.example.com");
    assert_eq!(
        build_embed_url(&origin, PERFORMANCE_PAGE_PATH, "token=tok"),
        "https://embed.example.com/embed/pages/performance?token=tok"
    );
}

#[test]
fn performance_url_contains_only_populated_params() {
    let origin = EmbedOrigin::new("embed.example.com");
    let params = PerformanceParams {
        from: Some("2020-01-01".into()),
        to: None,
        currency_iso_code: Some("GBP".into()),
        investor_ext_refs: vec!["inv-1".into(), "inv-2".into()],
        investor_account_ext_refs: Vec::new(),
    };
    assert_eq!(
        performance_url(&origin, "tok", &params),
        "https://embed.example.com/embed/pages/performance\
         ?token=tok&from=2020-01-01&currencyIsoCode=GBP&investorExtRefs=inv-1%2Cinv-2"
    );
}

#[test]
fn http_origins_build_http_urls() {
    let origin = EmbedOrigin::with_protocol(Protocol::Http, "localhost:3000");
    assert_eq!(
        performance_url(&origin, "tok", &PerformanceParams::default()),
        "http://localhost:3000/embed/pages/performance?token=tok"
    );
}
