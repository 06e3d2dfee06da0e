#[cfg(test)]
mod tests {
    use crate::actor::RateLimiterActor;
    use crate::types::CheckRequest;
    use std::time::{Duration, SystemTime};
    use windowcrab::{MemoryStore, Quota};

    fn request(identifier: &str, quota: Quota, timestamp: SystemTime) -> CheckRequest {
        CheckRequest {
            identifier: identifier.to_string(),
            action: "create-idea".to_string(),
            quota,
            timestamp,
        }
    }

    #[tokio::test]
    async fn test_basic_rate_limiting() {
        let handle = RateLimiterActor::spawn(100, MemoryStore::with_capacity(1000));
        let quota = Quota::new(3, 60).unwrap();
        let now = SystemTime::now();

        let resp = handle.check(request("1.2.3.4", quota, now)).await.unwrap();
        assert!(resp.allowed);
        assert_eq!(resp.limit, 3);
        assert_eq!(resp.remaining, 2);
        assert_eq!(resp.retry_after, 0);
    }

    #[tokio::test]
    async fn test_concurrent_requests() {
        let handle = RateLimiterActor::spawn(100, MemoryStore::new());
        let req = request("concurrent_test", Quota::new(10, 60).unwrap(), SystemTime::now());

        // Send multiple concurrent requests
        let mut handles = vec![];
        for _ in 0..20 {
            let h = handle.clone();
            let r = req.clone();
            handles.push(tokio::spawn(async move { h.check(r).await }));
        }

        let mut allowed_count = 0;
        for h in handles {
            let result = h.await.unwrap().unwrap();
            if result.allowed {
                allowed_count += 1;
            }
        }

        // Exactly the quota is admitted
        assert_eq!(allowed_count, 10);
    }

    #[tokio::test]
    async fn test_remaining_and_reset() {
        let handle = RateLimiterActor::spawn(100, MemoryStore::new());
        let quota = Quota::new(2, 60).unwrap();
        let now = SystemTime::now();

        handle.check(request("1.2.3.4", quota, now)).await.unwrap();
        handle.check(request("1.2.3.4", quota, now)).await.unwrap();
        let denied = handle.check(request("1.2.3.4", quota, now)).await.unwrap();
        assert!(!denied.allowed);
        assert!(denied.retry_after > 0);

        let remaining = handle
            .remaining("1.2.3.4".into(), "create-idea".into(), 2, now)
            .await
            .unwrap();
        assert_eq!(remaining, 0);

        assert!(
            handle
                .reset("1.2.3.4".into(), "create-idea".into())
                .await
                .unwrap()
        );
        let again = handle.check(request("1.2.3.4", quota, now)).await.unwrap();
        assert!(again.allowed);
    }

    #[tokio::test]
    async fn test_sweep_and_stats() {
        let handle = RateLimiterActor::spawn(100, MemoryStore::new());
        let quota = Quota::new(1, 10).unwrap();
        let now = SystemTime::now();

        for i in 0..5 {
            handle
                .check(request(&format!("10.0.0.{i}"), quota, now))
                .await
                .unwrap();
        }
        assert_eq!(handle.stats().await.unwrap().active_keys, 5);

        assert_eq!(handle.sweep(now).await.unwrap(), 0);
        assert_eq!(
            handle.sweep(now + Duration::from_secs(10)).await.unwrap(),
            5
        );
        assert_eq!(handle.stats().await.unwrap().active_keys, 0);
    }

    #[tokio::test]
    async fn test_reset_all() {
        let handle = RateLimiterActor::spawn(100, MemoryStore::new());
        let quota = Quota::new(1, 60).unwrap();
        let now = SystemTime::now();

        for ip in ["1.1.1.1", "2.2.2.2"] {
            handle.check(request(ip, quota, now)).await.unwrap();
            assert!(!handle.check(request(ip, quota, now)).await.unwrap().allowed);
        }

        handle.reset_all().await.unwrap();

        for ip in ["1.1.1.1", "2.2.2.2"] {
            assert!(handle.check(request(ip, quota, now)).await.unwrap().allowed);
        }
    }
}
