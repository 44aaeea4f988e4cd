//! # Dispatch Scenarios
//!
//! Routing through the hierarchy, priority ordering, the cancellation and
//! generic filters, and failure isolation, driven through a rooted bus.

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        init_tracing, Delivery, GameEvent, PlayerChat, PlayerEvent, Potion, Sword, Tick, Unrelated,
    };
    use anyhow::bail;
    use parking_lot::Mutex;
    use rand::seq::SliceRandom;
    use relay_core::{
        BusConfig, Cancellable, ConfigError, EventBus, EventBusExt, EventType, PostOrder,
        SimpleEventBus, Subscriber,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn game_bus() -> SimpleEventBus {
        init_tracing();
        SimpleEventBus::with_config(BusConfig::default().with_name("game"))
            .expect("valid config")
            .rooted_at::<GameEvent>()
    }

    fn recorder() -> Arc<Mutex<Vec<&'static str>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    // =============================================================================
    // ROUTING
    // =============================================================================

    #[test]
    fn test_supertype_subscribers_receive_subtypes() {
        let bus = game_bus();
        let seen = recorder();

        let log = Arc::clone(&seen);
        bus.register(&Subscriber::to::<GameEvent>().dyn_handler(move |_| {
            log.lock().push("game");
            Ok(())
        }))
        .expect("register");
        let log = Arc::clone(&seen);
        bus.subscribe(move |event: &PlayerEvent| {
            log.lock().push(event.player);
            Ok(())
        })
        .expect("register");

        assert!(bus.post(&PlayerChat::new("ada", "hi")).is_success());
        assert!(bus.post(&Tick(1)).is_success());
        assert!(bus.post(&Unrelated).is_success());

        let mut seen = seen.lock().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec!["ada", "game", "game"]);
    }

    #[test]
    fn test_has_subscribers_counts_supertypes() {
        let bus = game_bus();
        assert!(!bus.has_subscribers_for::<PlayerChat>());

        bus.subscribe(|_: &PlayerEvent| Ok(())).expect("register");
        assert!(bus.has_subscribers_for::<PlayerEvent>());
        assert!(bus.has_subscribers_for::<PlayerChat>());
        assert!(!bus.has_subscribers_for::<Tick>());
        assert!(!bus.has_subscribers(EventType::of::<Unrelated>()));
    }

    // =============================================================================
    // ORDERING
    // =============================================================================

    #[test]
    fn test_priority_independent_of_registration_order() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let bus = game_bus();
            let seen = Arc::new(Mutex::new(Vec::new()));

            let mut orders = vec![PostOrder::Late, PostOrder::First, PostOrder::Normal];
            orders.shuffle(&mut rng);
            for order in orders {
                let log = Arc::clone(&seen);
                bus.register(&Subscriber::to::<Tick>().order(order).handler(move |_: &Tick| {
                    log.lock().push(order);
                    Ok(())
                }))
                .expect("register");
            }

            assert!(bus.post(&Tick(0)).is_success());
            assert_eq!(
                *seen.lock(),
                vec![PostOrder::First, PostOrder::Normal, PostOrder::Late]
            );
        }
    }

    #[test]
    fn test_priority_spans_hierarchy_levels() {
        let bus = game_bus();
        let seen = recorder();

        let log = Arc::clone(&seen);
        bus.register(&Subscriber::to::<PlayerChat>().order(PostOrder::Last).handler(
            move |_: &PlayerChat| {
                log.lock().push("chat:last");
                Ok(())
            },
        ))
        .expect("register");
        let log = Arc::clone(&seen);
        bus.register(&Subscriber::to::<GameEvent>().order(PostOrder::First).dyn_handler(
            move |_| {
                log.lock().push("game:first");
                Ok(())
            },
        ))
        .expect("register");
        let log = Arc::clone(&seen);
        bus.register(&Subscriber::to::<PlayerEvent>().order(PostOrder::Early).handler(
            move |_: &PlayerEvent| {
                log.lock().push("player:early");
                Ok(())
            },
        ))
        .expect("register");

        assert!(bus.post(&PlayerChat::new("bo", "gg")).is_success());
        assert_eq!(*seen.lock(), vec!["game:first", "player:early", "chat:last"]);
    }

    // =============================================================================
    // FILTERS
    // =============================================================================

    #[test]
    fn test_cancellation_toggle() {
        let bus = game_bus();
        let strict_calls = Arc::new(AtomicUsize::new(0));

        let calls = Arc::clone(&strict_calls);
        bus.register(&Subscriber::to::<PlayerChat>().ignore_cancelled().handler(
            move |_: &PlayerChat| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        ))
        .expect("register");

        let chat = PlayerChat::new("cy", "spam");
        for (cancelled, expected) in [(true, 0), (false, 1), (true, 1), (false, 2)] {
            chat.cancellation.set_cancelled(cancelled);
            assert!(bus.post(&chat).is_success());
            assert_eq!(strict_calls.load(Ordering::SeqCst), expected);
        }
    }

    #[test]
    fn test_moderator_cancels_for_later_subscribers() {
        let bus = game_bus();
        let seen = recorder();

        bus.register(&Subscriber::to::<PlayerChat>().order(PostOrder::Early).handler(
            |chat: &PlayerChat| {
                if chat.message.contains("spam") {
                    chat.cancellation.set_cancelled(true);
                }
                Ok(())
            },
        ))
        .expect("register");
        let log = Arc::clone(&seen);
        bus.register(&Subscriber::to::<PlayerChat>().ignore_cancelled().handler(
            move |_: &PlayerChat| {
                log.lock().push("broadcast");
                Ok(())
            },
        ))
        .expect("register");
        let log = Arc::clone(&seen);
        bus.register(&Subscriber::to::<PlayerChat>().order(PostOrder::Last).handler(
            move |_: &PlayerChat| {
                log.lock().push("audit");
                Ok(())
            },
        ))
        .expect("register");

        let _ = bus.post(&PlayerChat::new("dee", "hello"));
        let _ = bus.post(&PlayerChat::new("dee", "spam spam"));
        assert_eq!(*seen.lock(), vec!["broadcast", "audit", "audit"]);
    }

    #[test]
    fn test_generic_filter_distinguishes_payloads() {
        let bus = game_bus();
        let swords = Arc::new(AtomicUsize::new(0));
        let any = Arc::new(AtomicUsize::new(0));

        let count = Arc::clone(&swords);
        bus.register(&Subscriber::to::<Delivery>().generic_of::<Sword>().handler(
            move |_: &Delivery| {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        ))
        .expect("register");
        let count = Arc::clone(&any);
        bus.subscribe(move |_: &Delivery| {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .expect("register");

        let _ = bus.post(&Delivery::of::<Potion>());
        let _ = bus.post(&Delivery::of::<Sword>());
        let _ = bus.post(&Delivery::of::<Potion>());

        assert_eq!(swords.load(Ordering::SeqCst), 1);
        assert_eq!(any.load(Ordering::SeqCst), 3);
    }

    // =============================================================================
    // FAILURES
    // =============================================================================

    #[test]
    fn test_failure_isolation() {
        let bus = game_bus();
        let b_calls = Arc::new(AtomicUsize::new(0));

        bus.register(&Subscriber::to::<Tick>().order(PostOrder::First).handler(|t: &Tick| {
            if t.0 % 5 == 0 {
                bail!("{} divisible by 5", t.0);
            }
            Ok(())
        }))
        .expect("register");
        let calls = Arc::clone(&b_calls);
        bus.register(&Subscriber::to::<Tick>().order(PostOrder::Last).handler(move |t: &Tick| {
            calls.fetch_add(1, Ordering::SeqCst);
            if t.0 % 2 == 0 {
                bail!("{} is even", t.0);
            }
            Ok(())
        }))
        .expect("register");

        assert!(bus.post(&Tick(7)).is_success());
        assert_eq!(bus.post(&Tick(5)).failures().len(), 1);

        let result = bus.post(&Tick(10));
        assert_eq!(result.failures().len(), 2);
        assert_eq!(
            result.to_string(),
            "PostResult{type=failure, exceptions=[10 divisible by 5, 10 is even]}"
        );
        assert_eq!(b_calls.load(Ordering::SeqCst), 3);

        let composite = result.raise().expect_err("fail fast");
        let orders: Vec<PostOrder> = composite
            .failures()
            .iter()
            .map(|f| f.subscriber().post_order())
            .collect();
        assert_eq!(orders, vec![PostOrder::First, PostOrder::Last]);
    }

    #[test]
    fn test_panicking_subscriber_does_not_stop_dispatch() {
        let bus = game_bus();
        let after = Arc::new(AtomicUsize::new(0));

        bus.register(
            &Subscriber::to::<Tick>()
                .order(PostOrder::First)
                .handler(|_: &Tick| panic!("tick handler crashed")),
        )
        .expect("register");
        let calls = Arc::clone(&after);
        bus.subscribe(move |_: &Tick| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .expect("register");

        let result = bus.post(&Tick(1));
        assert_eq!(result.failures().len(), 1);
        assert!(result.failures()[0].is_panic());
        assert_eq!(after.load(Ordering::SeqCst), 1);
    }

    // =============================================================================
    // REGISTRATION LIFECYCLE
    // =============================================================================

    #[test]
    fn test_unregister_then_post() {
        let bus = game_bus();
        let calls = Arc::new(AtomicUsize::new(0));

        let count = Arc::clone(&calls);
        let subscriber = bus
            .subscribe(move |_: &Tick| {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .expect("register");

        let _ = bus.post(&Tick(1));
        assert!(bus.unregister(&subscriber));
        assert!(!bus.unregister(&subscriber));
        let _ = bus.post(&Tick(2));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregister_all_twice_then_post() {
        let bus = game_bus();
        bus.subscribe(|_: &Tick| bail!("never runs")).expect("register");
        bus.subscribe(|_: &PlayerEvent| bail!("never runs")).expect("register");

        bus.unregister_all();
        bus.unregister_all();

        assert!(bus.subscribers().is_empty());
        assert!(bus.post(&Tick(3)).is_success());
        assert!(bus.post(&PlayerChat::new("eve", "anyone?")).is_success());
    }

    #[test]
    fn test_root_rejects_foreign_subscriber() {
        let bus = game_bus();
        let error = bus.subscribe(|_: &Unrelated| Ok(())).expect_err("rejected");
        assert!(error.to_string().contains("not assignable"));
        assert_eq!(bus.root_type(), Some(EventType::of::<GameEvent>()));
    }

    // =============================================================================
    // CONFIGURATION
    // =============================================================================

    #[test]
    fn test_config_from_json() {
        let config: BusConfig = serde_json::from_str(
            r#"{"name": "lobby", "log_failures": false, "cache_capacity": 4}"#,
        )
        .expect("parse");
        assert_eq!(config.name, "lobby");
        assert!(config.catch_panics);
        assert!(!config.log_failures);

        let bus = SimpleEventBus::with_config(config.clone()).expect("valid config");
        assert_eq!(bus.config(), &config);

        let unnamed: BusConfig = serde_json::from_str(r#"{"name": ""}"#).expect("parse");
        assert!(matches!(
            SimpleEventBus::with_config(unnamed),
            Err(ConfigError::EmptyName)
        ));

        let json = serde_json::to_value(&config).expect("serialize");
        assert_eq!(json["cache_capacity"], 4);
    }

    #[test]
    fn test_config_from_env() {
        std::env::set_var("RELAY_BUS_NAME", "from-env");
        std::env::set_var("RELAY_CATCH_PANICS", "0");
        std::env::set_var("RELAY_CACHE_CAPACITY", "16");
        let config = BusConfig::from_env().expect("valid env");
        assert_eq!(config.name, "from-env");
        assert!(!config.catch_panics);
        assert!(config.log_failures);
        assert_eq!(config.cache_capacity, 16);

        std::env::set_var("RELAY_CACHE_CAPACITY", "lots");
        assert!(matches!(
            BusConfig::from_env(),
            Err(ConfigError::InvalidEnv {
                var: "RELAY_CACHE_CAPACITY",
                ..
            })
        ));

        for var in ["RELAY_BUS_NAME", "RELAY_CATCH_PANICS", "RELAY_CACHE_CAPACITY"] {
            std::env::remove_var(var);
        }
    }
}
