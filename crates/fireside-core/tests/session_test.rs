#![allow(clippy::unwrap_used)]
// Integration tests for `Session` against a mock server.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fireside_api::models::TransactionType;
use fireside_api::{AccountFilter, Credentials, DateRange, TransactionFilter, TransportConfig};
use fireside_core::{
    CoreError, DashboardSection, DataSource, FileStorage, LocalCache, MemorySecureStore,
    ReactiveStore, SecureStore, Session, SessionParts,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn account_json(id: u32, name: &str) -> Value {
    json!({
        "type": "accounts",
        "id": id.to_string(),
        "attributes": { "name": name, "type": "asset", "current_balance": "1.00" }
    })
}

fn transaction_json(id: u32, kind: &str, date: &str) -> Value {
    json!({
        "type": "transactions",
        "id": id.to_string(),
        "attributes": { "transactions": [{
            "type": kind, "date": date, "amount": "5.00", "description": "Groceries"
        }]}
    })
}

fn page(data: Vec<Value>) -> Value {
    let count = data.len();
    json!({ "data": data, "meta": { "pagination": {
        "total": count, "count": count, "per_page": 50,
        "current_page": 1, "total_pages": 1
    }}})
}

async fn mount_about(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/about"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "version": "6.1.0", "api_version": "2.0.14" }
        })))
        .mount(server)
        .await;
}

async fn mount_accounts(server: &MockServer, ids: &[u32]) {
    let data = ids.iter().map(|id| account_json(*id, "Acct")).collect();
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(data)))
        .mount(server)
        .await;
}

fn transport(timeout_ms: u64) -> TransportConfig {
    TransportConfig {
        timeout: Duration::from_millis(timeout_ms),
        ..TransportConfig::default()
    }
}

struct Fixture {
    session: Session,
    secure: Arc<MemorySecureStore>,
}

fn fixture(dir: &std::path::Path, timeout_ms: u64) -> Fixture {
    let storage = Arc::new(FileStorage::new(dir));
    let secure = Arc::new(MemorySecureStore::new());
    let session = Session::new(SessionParts {
        store: Arc::new(ReactiveStore::with_storage(storage.clone())),
        cache: LocalCache::new(storage),
        secure_store: secure.clone(),
        transport: transport(timeout_ms),
    });
    Fixture { session, secure }
}

// ── Credential lifecycle ────────────────────────────────────────────

#[tokio::test]
async fn test_sign_in_persists_credentials_securely() {
    let server = MockServer::start().await;
    mount_about(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let fx = fixture(dir.path(), 2_000);

    let info = fx
        .session
        .sign_in(Credentials::new(server.uri(), "secret-token"))
        .await
        .unwrap();

    assert_eq!(info.version, "6.1.0");
    assert!(fx.session.store().is_authenticated());
    assert!(fx.secure.raw_record().unwrap().contains("secret-token"));

    // Nothing in general device storage knows the token.
    fx.session.store().set_balance_visible(false);
    for entry in std::fs::read_dir(dir.path()).unwrap() {
        let content = std::fs::read_to_string(entry.unwrap().path()).unwrap();
        assert!(!content.contains("secret-token"));
    }
}

#[tokio::test]
async fn test_rejected_token_is_not_saved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/about"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let fx = fixture(dir.path(), 2_000);

    let err = fx
        .session
        .sign_in(Credentials::new(server.uri(), "bad"))
        .await
        .unwrap_err();

    assert!(err.is_auth_failure(), "got {err:?}");
    assert!(fx.secure.load().unwrap().is_none());
    assert!(!fx.session.store().is_authenticated());
    assert!(fx.session.client().is_err());
}

#[tokio::test]
async fn test_refresh_before_sign_in_is_not_initialized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let session = Session::in_memory(TransportConfig::default());

    let err = session
        .refresh_accounts(&AccountFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Api(fireside_api::Error::NotInitialized)
    ));
}

// ── Write-through & offline ─────────────────────────────────────────

#[tokio::test]
async fn test_refresh_writes_through_to_cache_and_mirror() {
    let server = MockServer::start().await;
    mount_accounts(&server, &[1, 2, 3]).await;
    let dir = tempfile::tempdir().unwrap();
    let fx = fixture(dir.path(), 2_000);
    fx.session
        .set_credentials(Credentials::new(server.uri(), "t"))
        .unwrap();

    let data = fx
        .session
        .refresh_accounts(&AccountFilter::default())
        .await
        .unwrap();

    assert_eq!(data.len(), 3);
    let entry = fx.session.cache().get_accounts().unwrap();
    assert_eq!(entry.data, *data);
    assert_eq!(
        fx.session.store().last_accounts_sync(),
        Some(entry.metadata.last_synced)
    );
    assert_eq!(fx.session.store().cached_accounts().unwrap(), data);
}

#[tokio::test]
async fn test_type_filtered_refresh_is_not_cached() {
    let server = MockServer::start().await;
    mount_accounts(&server, &[9]).await;
    let session = Session::in_memory(TransportConfig::default());
    session
        .set_credentials(Credentials::new(server.uri(), "t"))
        .unwrap();

    let filter = AccountFilter::of_type(fireside_api::models::AccountType::Expense);
    let data = session.refresh_accounts(&filter).await.unwrap();

    assert_eq!(data.len(), 1);
    assert!(session.cache().get_accounts().is_none());
    assert!(session.store().cached_accounts().is_none());
}

#[tokio::test]
async fn test_failed_refresh_keeps_last_good_data() {
    let server = MockServer::start().await;
    let session = Session::in_memory(TransportConfig::default());
    session
        .set_credentials(Credentials::new(server.uri(), "t"))
        .unwrap();

    mount_accounts(&server, &[1]).await;
    session
        .refresh_accounts(&AccountFilter::default())
        .await
        .unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})))
        .mount(&server)
        .await;

    let err = session
        .refresh_accounts(&AccountFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Api(fireside_api::Error::ServerError { .. })
    ));
    assert_eq!(session.store().cached_accounts().unwrap().len(), 1);
    assert_eq!(session.cache().get_accounts().unwrap().data.len(), 1);

    // Only `Unreachable` triggers the offline fallback.
    let err = session
        .accounts_offline_first(&AccountFilter::default())
        .await
        .unwrap_err();
    assert!(!err.is_offline());
}

#[tokio::test]
async fn test_unreachable_server_serves_mirror() {
    let server = MockServer::start().await;
    let session = Session::in_memory(transport(200));
    session
        .set_credentials(Credentials::new(server.uri(), "t"))
        .unwrap();

    mount_accounts(&server, &[1, 2]).await;
    let live = session
        .accounts_offline_first(&AccountFilter::default())
        .await
        .unwrap();
    assert!(live.is_live());

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let offline = session
        .accounts_offline_first(&AccountFilter::default())
        .await
        .unwrap();
    assert_eq!(offline.data.len(), 2);
    assert_eq!(
        offline.source,
        DataSource::Cached {
            last_synced: session.store().last_accounts_sync()
        }
    );
}

#[tokio::test]
async fn test_unreachable_without_cache_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/transactions"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    let session = Session::in_memory(transport(200));
    session
        .set_credentials(Credentials::new(server.uri(), "t"))
        .unwrap();

    let err = session
        .transactions_offline_first(&TransactionFilter::default())
        .await
        .unwrap_err();
    assert!(err.is_offline());
}

#[tokio::test]
async fn test_unreachable_transactions_apply_filter_to_mirror() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![
            transaction_json(1, "withdrawal", "2026-03-02T10:00:00+00:00"),
            transaction_json(2, "deposit", "2026-03-05T10:00:00+00:00"),
            transaction_json(3, "deposit", "2026-04-01T10:00:00+00:00"),
        ])))
        .mount(&server)
        .await;
    let session = Session::in_memory(transport(200));
    session
        .set_credentials(Credentials::new(server.uri(), "t"))
        .unwrap();
    session
        .refresh_transactions(&TransactionFilter::default())
        .await
        .unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/transactions"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let deposits = TransactionFilter {
        transaction_type: Some(TransactionType::Deposit),
        ..TransactionFilter::default()
    };
    let offline = session.transactions_offline_first(&deposits).await.unwrap();
    assert!(!offline.is_live());
    let ids: Vec<&str> = offline.data.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "3"]);

    let march_deposits = TransactionFilter {
        range: DateRange::new(
            chrono::NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        ),
        ..deposits
    };
    let offline = session
        .transactions_offline_first(&march_deposits)
        .await
        .unwrap();
    let ids: Vec<&str> = offline.data.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["2"]);

    // The mirror itself is untouched.
    assert_eq!(session.store().cached_transactions().unwrap().len(), 3);
}

#[tokio::test]
async fn test_slow_older_refresh_cannot_overwrite_newer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .and(query_param("date", "2026-01-01"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(vec![account_json(1, "Old")]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .and(query_param("date", "2026-02-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![account_json(2, "New")])))
        .mount(&server)
        .await;

    let session = Session::in_memory(TransportConfig::default());
    session
        .set_credentials(Credentials::new(server.uri(), "t"))
        .unwrap();

    let older = AccountFilter {
        date: chrono::NaiveDate::from_ymd_opt(2026, 1, 1),
        ..AccountFilter::default()
    };
    let newer = AccountFilter {
        date: chrono::NaiveDate::from_ymd_opt(2026, 2, 1),
        ..AccountFilter::default()
    };

    // `join!` polls in order, so the slow request takes the older ticket.
    let (old, new) = tokio::join!(
        session.refresh_accounts(&older),
        session.refresh_accounts(&newer)
    );
    assert_eq!(old.unwrap()[0].id, "1");
    assert_eq!(new.unwrap()[0].id, "2");

    assert_eq!(session.store().cached_accounts().unwrap()[0].id, "2");
    assert_eq!(session.cache().get_accounts().unwrap().data[0].id, "2");
}

// ── Sign-out & cold start ───────────────────────────────────────────

#[tokio::test]
async fn test_sign_out_wipes_session_but_keeps_preferences() {
    let server = MockServer::start().await;
    mount_accounts(&server, &[1]).await;
    let dir = tempfile::tempdir().unwrap();
    let fx = fixture(dir.path(), 2_000);
    let session = &fx.session;
    session
        .set_credentials(Credentials::new(server.uri(), "t"))
        .unwrap();
    session
        .refresh_accounts(&AccountFilter::default())
        .await
        .unwrap();
    session.store().set_balance_visible(false);
    session
        .store()
        .move_dashboard_section_to_hidden(DashboardSection::Bills);
    let layout = session.store().dashboard_layout();

    session.clear_credentials().unwrap();

    assert!(fx.secure.load().unwrap().is_none());
    assert!(session.client().is_err());
    assert!(session.cache().get_accounts().is_none());
    let state = session.store().snapshot();
    assert!(!state.credentials.is_authenticated);
    assert!(state.cache.accounts.data.is_none());
    assert!(state.pending.transactions.is_empty());
    assert!(!state.ui.balance_visible);
    assert_eq!(state.dashboard, layout);
}

#[tokio::test]
async fn test_cold_start_restores_session_and_cache() {
    let server = MockServer::start().await;
    mount_accounts(&server, &[4, 5]).await;
    let dir = tempfile::tempdir().unwrap();
    let secure = Arc::new(MemorySecureStore::new());

    {
        let storage = Arc::new(FileStorage::new(dir.path()));
        let session = Session::new(SessionParts {
            store: Arc::new(ReactiveStore::with_storage(storage.clone())),
            cache: LocalCache::new(storage),
            secure_store: secure.clone(),
            transport: TransportConfig::default(),
        });
        session
            .set_credentials(Credentials::new(server.uri(), "t"))
            .unwrap();
        session
            .refresh_accounts(&AccountFilter::default())
            .await
            .unwrap();
        session.store().set_balance_visible(false);
    }

    // A memory-only store proves the mirror comes from the cache entries.
    let session = Session::new(SessionParts {
        store: Arc::new(ReactiveStore::new()),
        cache: LocalCache::new(Arc::new(FileStorage::new(dir.path()))),
        secure_store: secure,
        transport: TransportConfig::default(),
    });
    assert!(session.load_credentials().unwrap());
    assert!(session.store().is_authenticated());
    assert!(session.hydrate_from_cache());
    assert_eq!(session.store().cached_accounts().unwrap().len(), 2);

    // The persisted snapshot alone also carries preferences and mirror.
    let restored = ReactiveStore::with_storage(Arc::new(FileStorage::new(dir.path())));
    assert!(!restored.balance_visible());
    assert_eq!(restored.cached_accounts().unwrap().len(), 2);
    assert!(!restored.is_authenticated());
}
