//! End-to-end analyses against both catalog bindings.

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use pcset::config::CatalogSource;
use pcset::{Analyzer, AnyCatalog, Classification, Error, LocalCatalog, RemoteCatalog};

/// Start a catalog service which answers from `replies`, or `unclassified`
/// for unknown keys. Returns its address.
async fn serve(replies: HashMap<&'static str, &'static str>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let (reader, mut writer) = stream.into_split();
            let mut request = String::new();
            if BufReader::new(reader).read_line(&mut request).await.is_err() {
                continue;
            }

            let reply = replies.get(request.trim()).copied().unwrap_or("unclassified");
            let _ = writer.write_all(format!("{}\n", reply).as_bytes()).await;
        }
    });

    address
}

/// Start a service which accepts connections but never answers.
async fn serve_silently() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    address
}

fn standard() -> Analyzer<AnyCatalog> {
    Analyzer::new(AnyCatalog::Local(LocalCatalog::standard().unwrap()))
}

#[tokio::test]
async fn major_triad_by_name() {
    let result = standard().analyze("C E G").await.unwrap().unwrap();

    assert_eq!(result.parsed.values(), vec![0, 4, 7]);
    assert_eq!(result.normal_form.values(), vec![0, 4, 7]);
    assert_eq!(result.prime_form.values(), vec![0, 3, 7]);
    assert_eq!(result.interval_class_vector.counts(), [0, 0, 1, 1, 1, 0]);
    assert_eq!(result.classification.code_str(), "3-11");
    assert_eq!(result.complement_classification.code_str(), "9-11");
}

#[tokio::test]
async fn minor_seventh_with_flats() {
    let result = standard().analyze("C Eb G Bb").await.unwrap().unwrap();

    assert_eq!(result.parsed.values(), vec![0, 3, 7, 10]);
    assert_eq!(result.normal_form.values(), vec![7, 10, 0, 3]);
    assert_eq!(result.prime_form.key(), "0,3,5,8");
    assert_eq!(result.classification.code_str(), "4-26");
    assert_eq!(result.complement_classification.code_str(), "8-26");
}

#[tokio::test]
async fn unrecognized_token() {
    match standard().analyze("xyz").await {
        Err(Error::Parse { token }) => assert_eq!(token, "xyz"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn empty_input() {
    assert_eq!(standard().analyze("").await.unwrap(), None);
    assert_eq!(standard().analyze("   \n ").await.unwrap(), None);
}

#[tokio::test]
async fn prime_form_missing_from_catalog() {
    let catalog = LocalCatalog::from_json(r#"{"0,3,7": "3-11"}"#, "{}").unwrap();
    let mut analyzer = Analyzer::new(catalog);
    let result = analyzer.analyze("0 1 2 3 4").await.unwrap().unwrap();

    assert_eq!(result.classification, Classification::Unclassified);
    assert_eq!(result.classification.code_str(), "unclassified");
    assert_eq!(result.z_relation_mate(), None);
}

#[tokio::test]
async fn parsed_sets_are_ascending_and_distinct() {
    let mut analyzer = standard();

    for mask in 1u16..4096 {
        let input: Vec<String> = (0..12)
            .rev()
            .filter(|i| (mask >> i) & 1 == 1)
            .map(|i: i64| (i - 24).to_string())
            .collect();

        let result = analyzer.analyze(&input.join(", ")).await.unwrap().unwrap();
        let parsed = result.parsed.values();

        assert!(parsed.windows(2).all(|w| w[0] < w[1]), "{:?}", parsed);
        assert!(parsed.iter().all(|&pc| pc < 12));
        assert_eq!(parsed.len(), mask.count_ones() as usize);
    }
}

#[tokio::test]
async fn remote_catalog_classifies() {
    let mut replies = HashMap::new();
    replies.insert("0,3,7", "3-11");
    let address = serve(replies).await;

    let mut analyzer = Analyzer::new(RemoteCatalog::new(address));
    let result = analyzer.analyze("C E G").await.unwrap().unwrap();

    assert_eq!(result.classification.code_str(), "3-11");
    assert_eq!(result.z_relation_mate(), None);
    assert_eq!(result.complement_classification.code_str(), "9-11");
    assert!(!result.complement_verified);
}

#[tokio::test]
async fn remote_catalog_unclassified() {
    let address = serve(HashMap::new()).await;

    let mut analyzer = Analyzer::new(RemoteCatalog::new(address));
    let result = analyzer.analyze("0 1 2").await.unwrap().unwrap();

    assert_eq!(result.classification, Classification::Unclassified);
}

#[tokio::test]
async fn remote_catalog_reported_failure() {
    let mut replies = HashMap::new();
    replies.insert("0,3,7", "ERR database offline");
    let address = serve(replies).await;

    let mut analyzer = Analyzer::new(RemoteCatalog::new(address));
    match analyzer.analyze("C E G").await {
        Err(Error::Lookup { key, source }) => {
            assert_eq!(key, "0,3,7");
            assert_eq!(source.to_string(), "database offline");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn remote_catalog_timeout() {
    let address = serve_silently().await;
    let catalog = RemoteCatalog::new(address).with_timeout(Duration::from_millis(50));

    let mut analyzer = Analyzer::new(catalog);
    match analyzer.analyze("C E G").await {
        Err(Error::Lookup { source, .. }) => assert_eq!(source.kind(), io::ErrorKind::TimedOut),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn remote_catalog_unreachable() {
    let address = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().to_string()
    };

    let mut analyzer = Analyzer::new(RemoteCatalog::new(address));
    assert!(matches!(analyzer.analyze("C E G").await, Err(Error::Lookup { .. })));
}

#[tokio::test]
async fn remote_catalog_from_config() {
    let mut replies = HashMap::new();
    replies.insert("0,1,4,6", "4-Z15");
    let address = serve(replies).await;

    let source = CatalogSource::Remote { address, timeout_ms: 1000 };
    let mut analyzer = Analyzer::new(source.open().await.unwrap());
    let result = analyzer.analyze("0 1 4 6").await.unwrap().unwrap();

    assert_eq!(result.classification.code_str(), "4-Z15");
    assert_eq!(result.complement_classification.code_str(), "8-Z15");
}
