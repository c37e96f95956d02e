//! End-to-end walk through the client-rendered console against the fake
//! backend: sign in by OTP, review KYC, manage buyers, sign out.

use him_client::pages::{BuyersPage, DashboardPage, LoginPage, PendingHelpersPage};
use him_client::{Credentials, Mount, Mutation, PageOutcome, SessionStore};
use him_net::{ApiClient, ApiConfig};
use him_shared::protocol::NewAccount;
use him_shared::types::Role;
use him_shared::Route;
use him_store::LocalStorage;
use him_testkit::{fixtures, MockBackend, ADMIN_PHONE, DEV_OTP};

fn store_for(base_url: &str) -> SessionStore<LocalStorage> {
    let api = ApiClient::new(ApiConfig::new(base_url).unwrap());
    SessionStore::new(LocalStorage::open_in_memory().unwrap(), api)
}

#[tokio::test]
async fn test_admin_session_lifecycle() {
    let mock = MockBackend::with_dev_otp();
    mock.seed_pending_helper(fixtures::pending_helper("H123")).await;
    mock.seed_pending_helper(fixtures::pending_helper("H456")).await;
    let server = mock.spawn().await.unwrap();
    let mut store = store_for(&server.base_url);
    store.hydrate();

    // Signed out: protected pages redirect without calling the backend.
    let (mount, _handle) = Mount::new();
    let outcome = DashboardPage::load(&store, &mount).await;
    assert_eq!(outcome.redirect(), Some(&Route::LOGIN));
    assert!(mock.requests().await.is_empty());

    // OTP login.
    let challenge = store.start_otp(ADMIN_PHONE).await.unwrap();
    assert_eq!(challenge.dev_otp.as_deref(), Some(DEV_OTP));
    let session = store
        .login(Credentials::Otp {
            phone: challenge.phone,
            otp: DEV_OTP.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(
        session.user.as_ref().and_then(|u| u.role.clone()),
        Some(Role::Admin)
    );
    assert!(matches!(
        LoginPage::open(&store),
        PageOutcome::Redirect(Route::Dashboard)
    ));

    // KYC review.
    let mut pending = PendingHelpersPage::load(&store, &mount)
        .await
        .ready()
        .unwrap();
    assert_eq!(pending.rows.len(), 2);
    assert_eq!(
        pending.approve(&store, &mount, "H123").await,
        Mutation::Applied
    );
    let reloaded = PendingHelpersPage::load(&store, &mount)
        .await
        .ready()
        .unwrap();
    let ids: Vec<_> = reloaded.rows.iter().map(|p| p.helper_id.as_str()).collect();
    assert_eq!(ids, ["H456"]);

    // Buyer created from a form with blank optional fields.
    let mut buyers = BuyersPage::load(&store, &mount).await.ready().unwrap();
    let account = NewAccount::from_form("", "asha@buyers.test", "", "", "");
    assert_eq!(
        buyers.create(&store, &mount, account).await,
        Mutation::Applied
    );
    assert_eq!(buyers.rows.len(), 1);
    let sent = mock.requests_to("/api/v1/admin/buyers").await;
    let body = sent.last().and_then(|r| r.body.clone()).unwrap();
    assert!(body["phone"].is_null());
    assert!(body["displayName"].is_null());

    // Logout is idempotent and gates the pages again.
    store.logout().unwrap();
    store.logout().unwrap();
    assert!(!store.is_authenticated());
    let outcome = BuyersPage::load(&store, &mount).await;
    assert_eq!(outcome.redirect(), Some(&Route::LOGIN));
}
