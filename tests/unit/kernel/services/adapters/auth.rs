use super::*;
use crate::models::UserId;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn session(user: &str) -> Session {
    Session {
        user: User {
            id: UserId::from(user),
            email: Some(format!("{user}@example.com")),
        },
        access_token: "token".to_string(),
        expires_at: None,
    }
}

#[test]
fn current_user_follows_the_session() {
    let auth = MemoryAuthProvider::new();
    assert_eq!(block_on(auth.current_user()), Ok(None));

    auth.sign_in(session("u1"));
    let user = block_on(auth.current_user()).unwrap().unwrap();
    assert_eq!(user.id, UserId::from("u1"));
    assert_eq!(user.email.as_deref(), Some("u1@example.com"));

    auth.expire();
    assert_eq!(block_on(auth.current_user()), Ok(None));
}

#[test]
fn sign_out_clears_session_and_notifies() {
    let auth = MemoryAuthProvider::signed_in(session("u1"));
    let mut changes = auth.subscribe();
    assert_eq!(
        changes.borrow_and_update().as_ref().map(|s| s.user.id.clone()),
        Some(UserId::from("u1"))
    );

    block_on(auth.sign_out()).unwrap();
    assert!(changes.has_changed().unwrap());
    assert_eq!(*changes.borrow_and_update(), None);
    assert_eq!(block_on(auth.session()), Ok(None));
    assert_eq!(block_on(auth.current_user()), Ok(None));
}
