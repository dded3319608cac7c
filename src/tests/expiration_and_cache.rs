#[cfg(test)]
mod test {

    use crate::cache::{CacheEntry, CredentialDefaults};
    use crate::helpers::time::{now_ms, skew_ms};
    use crate::observability::metrics::{get_metrics, scope_label};
    use crate::store::{AuthOptions, TokenData};
    use crate::tests::common::{cached_token, configured_store, FakeTransport, GMAIL_SCOPE, REFRESH_TOKEN};

    #[test]
    fn skew_stays_within_sixty_to_sixty_five_seconds() {
        for _ in 0..1000 {
            let skew = skew_ms();
            assert!((60_000..65_000).contains(&skew), "skew {skew}");
        }
    }

    #[test]
    fn validity_is_strict_and_needs_a_token() {
        let now = now_ms();
        let mut entry = CacheEntry::new("default", &CredentialDefaults::default());
        entry.expires_at = now + 120_000;
        assert_eq!(entry.valid_token(now, 60_000), None);

        entry.access_token = Some(String::new());
        assert_eq!(entry.valid_token(now, 60_000), None);

        entry.access_token = Some("tok".into());
        assert_eq!(entry.valid_token(now, 60_000), Some("tok"));
        assert_eq!(entry.valid_token(now + 60_000, 60_000), None);
        assert_eq!(entry.valid_token(now + 59_999, 60_000), Some("tok"));
    }

    #[tokio::test]
    async fn fresh_token_is_served_without_exchange() {
        let store = configured_store(FakeTransport::new()).await;
        store.set_tokens(&cached_token("gmail", "cached", 3_600_000)).await;

        let token = store.get_access_token(Some(&AuthOptions::for_scope("gmail"))).await.unwrap();

        assert_eq!(token, "cached");
        assert_eq!(store.transport().calls(), 0);
    }

    #[tokio::test]
    async fn token_inside_skew_window_is_refreshed() {
        let store = configured_store(FakeTransport::new()).await;
        store.set_tokens(&cached_token("gmail", "stale", 30_000)).await;

        let token = store.get_access_token(Some(&AuthOptions::for_scope("gmail"))).await.unwrap();

        assert_eq!(token, "token-1");
        assert_eq!(store.transport().calls(), 1);
        let entry = store.entry(Some(&"gmail".into())).await.unwrap();
        assert_eq!(entry.access_token.as_deref(), Some("token-1"));
        assert!(entry.expires_at > now_ms() + 3_500_000);
    }

    #[tokio::test]
    async fn token_just_outside_max_skew_is_still_cached() {
        let store = configured_store(FakeTransport::new()).await;
        store.set_tokens(&cached_token("gmail", "cached", 70_000)).await;

        let token = store.get_access_token(Some(&AuthOptions::for_scope("gmail"))).await.unwrap();

        assert_eq!(token, "cached");
        assert_eq!(store.transport().calls(), 0);
    }

    #[tokio::test]
    async fn extreme_injected_expiry_does_not_overflow() {
        let store = configured_store(FakeTransport::new()).await;
        let gmail = AuthOptions::for_scope("gmail");

        store
            .set_tokens(&TokenData {
                access_token: Some("ancient".into()),
                expires_at: Some(i64::MIN),
                scope: Some("gmail".into()),
                ..TokenData::default()
            })
            .await;
        assert_eq!(store.entry(Some(&"gmail".into())).await.unwrap().expires_in_secs(), 0);
        assert_eq!(store.get_access_token(Some(&gmail)).await.unwrap(), "token-1");

        store
            .set_tokens(&TokenData {
                access_token: Some("forever".into()),
                expires_at: Some(i64::MAX),
                scope: Some("gmail".into()),
                ..TokenData::default()
            })
            .await;
        assert_eq!(store.get_access_token(Some(&gmail)).await.unwrap(), "forever");
        assert_eq!(store.transport().calls(), 1);
    }

    #[test]
    fn validity_check_saturates_at_the_bounds() {
        let mut entry = CacheEntry::new("default", &CredentialDefaults::default());
        entry.access_token = Some("tok".into());

        entry.expires_at = i64::MIN;
        assert_eq!(entry.valid_token(now_ms(), skew_ms()), None);

        entry.expires_at = i64::MAX;
        assert_eq!(entry.valid_token(now_ms(), skew_ms()), Some("tok"));
    }

    #[tokio::test]
    async fn set_tokens_keeps_refresh_token_when_absent() {
        let store = configured_store(FakeTransport::new()).await;
        store.set_tokens(&cached_token("gmail", "first", 3_600_000)).await;

        store
            .set_tokens(&TokenData {
                access_token: Some("second".into()),
                expires_at: Some(now_ms() + 1_000),
                scope: Some("gmail".into()),
                ..TokenData::default()
            })
            .await;

        let entry = store.entry(Some(&"gmail".into())).await.unwrap();
        assert_eq!(entry.access_token.as_deref(), Some("second"));
        assert_eq!(entry.credentials.refresh_token.as_deref(), Some(REFRESH_TOKEN));
        assert_eq!(entry.scope, GMAIL_SCOPE);

        store
            .set_tokens(&TokenData {
                refresh_token: Some("refresh-injected".into()),
                obtained_at: Some(1_700_000_000),
                scope: Some("gmail".into()),
                ..TokenData::default()
            })
            .await;
        let entry = store.entry(Some(&"gmail".into())).await.unwrap();
        assert_eq!(entry.access_token.as_deref(), Some("second"));
        assert_eq!(entry.credentials.refresh_token.as_deref(), Some("refresh-injected"));
        assert_eq!(entry.obtained_at, 1_700_000_000);
    }

    #[tokio::test]
    async fn clear_all_resets_tokens_but_keeps_credentials() {
        let store = configured_store(FakeTransport::new()).await;
        store.set_tokens(&cached_token("gmail", "g", 3_600_000)).await;
        store.set_tokens(&cached_token("drive", "d", 3_600_000)).await;

        store.clear(None).await;

        for scope in ["gmail", "drive"] {
            let entry = store.entry(Some(&scope.into())).await.unwrap();
            assert_eq!(entry.access_token, None);
            assert_eq!(entry.expires_at, 0);
            assert_eq!(entry.obtained_at, 0);
            assert_eq!(entry.credentials.refresh_token.as_deref(), Some(REFRESH_TOKEN));
        }
        assert_eq!(store.to_json().await.scopes.len(), 2);

        // next request goes to the network again
        let token = store.get_access_token(Some(&AuthOptions::for_scope("drive"))).await.unwrap();
        assert_eq!(token, "token-1");
    }

    #[tokio::test]
    async fn clear_scope_leaves_other_scopes_alone() {
        let store = configured_store(FakeTransport::new()).await;
        store.set_tokens(&cached_token("gmail", "g", 3_600_000)).await;
        store.set_tokens(&cached_token("drive", "d", 3_600_000)).await;

        store.clear(Some(&AuthOptions::for_scope("gmail"))).await;

        assert_eq!(store.entry(Some(&"gmail".into())).await.unwrap().access_token, None);
        assert_eq!(
            store.entry(Some(&"drive".into())).await.unwrap().access_token.as_deref(),
            Some("d")
        );
    }

    #[tokio::test]
    async fn force_refresh_bypasses_valid_cache() {
        let store = configured_store(FakeTransport::new()).await;
        store.set_tokens(&cached_token("gmail", "cached", 3_600_000)).await;

        let token = store.force_refresh(Some(&AuthOptions::for_scope("gmail"))).await.unwrap();

        assert_eq!(token, "token-1");
        assert_eq!(store.transport().calls(), 1);
        // and the refreshed token is cached again
        let again = store.get_access_token(Some(&AuthOptions::for_scope("gmail"))).await.unwrap();
        assert_eq!(again, "token-1");
        assert_eq!(store.transport().calls(), 1);
    }

    #[tokio::test]
    async fn metrics_label_scopes_by_class_not_by_key() {
        assert_eq!(scope_label("default"), "default");
        assert_eq!(scope_label(GMAIL_SCOPE), "scoped");

        let store = configured_store(FakeTransport::new()).await;
        store.get_access_token(Some(&AuthOptions::for_scope("all"))).await.unwrap();
        store.get_access_token(Some(&AuthOptions::for_scope("all"))).await.unwrap();

        let encoded = get_metrics().await.encode().unwrap();
        assert!(encoded.contains(r#"gauth_cache_hits_total{scope="scoped"}"#));
        assert!(!encoded.contains("googleapis.com"));
    }
}
