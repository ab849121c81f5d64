//! Wiring: config → brain, adapters, robot and HTTP server.

use std::{path::Path, sync::Arc};

use {
    anyhow::Context,
    axum::{Json, Router, extract::State, response::IntoResponse, routing::get},
    nurph_brain::{Brain, SqliteDocumentStore, WritePolicy},
    nurph_channels::AdapterRegistry,
    nurph_config::{BrainBackend, BrainConfig, NurphConfig, WritePolicyKind},
    nurph_robot::{Robot, RobotConfig, commands},
    nurph_twilio::TwilioAdapter,
    nurph_webhook::WebhookAdapter,
    tracing::info,
};

/// A running robot and the HTTP routes that feed it.
pub struct App {
    pub robot: Arc<Robot>,
    pub router: Router,
}

impl App {
    /// Build everything `config` describes and start the adapters.
    ///
    /// `configure` can register extra listeners before the robot starts.
    pub async fn build(
        config: &NurphConfig,
        configure: impl FnOnce(&mut Robot) -> nurph_robot::Result<()>,
    ) -> anyhow::Result<Self> {
        let brain = build_brain(&config.brain).await?;

        let mut registry = AdapterRegistry::new();
        let mut router = Router::new();
        if let Some(section) = &config.adapters.twilio {
            let twilio = Arc::new(
                TwilioAdapter::from_value(section.clone()).context("twilio adapter config")?,
            );
            router = router.merge(twilio.router());
            registry.register(twilio);
        }
        if let Some(section) = &config.adapters.webhook {
            let webhook = Arc::new(
                WebhookAdapter::from_value(section.clone()).context("webhook adapter config")?,
            );
            router = router.merge(webhook.router());
            registry.register(webhook);
        }

        let robot_config = RobotConfig {
            name: config.bot.name.clone(),
            alias: config.bot.alias.clone(),
        };
        let mut robot = Robot::new(robot_config, brain, Arc::new(registry))?
            .with_user_tracking(config.bot.track_users);
        if config.bot.category_commands {
            commands::register(&mut robot)?;
        }
        configure(&mut robot)?;

        let robot = Arc::new(robot);
        robot.run().await?;

        let router = router.merge(
            Router::new()
                .route("/health", get(health_handler))
                .with_state(Arc::clone(&robot)),
        );
        Ok(Self { robot, router })
    }

    /// Serve HTTP until Ctrl-C, then stop the adapters.
    pub async fn serve(self, bind: &str, port: u16) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind((bind, port))
            .await
            .with_context(|| format!("failed to bind {bind}:{port}"))?;
        info!(addr = %listener.local_addr()?, "listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutting down");
            })
            .await?;
        self.robot.registry().stop_all().await;
        Ok(())
    }
}

pub async fn build_brain(config: &BrainConfig) -> anyhow::Result<Brain> {
    let brain = match config.backend {
        BrainBackend::Memory => {
            info!("using in-memory brain");
            Brain::in_memory()
        },
        BrainBackend::Sqlite => {
            let url = config
                .database_url
                .clone()
                .unwrap_or_else(nurph_config::default_database_url);
            if let Some(file) = url.strip_prefix("sqlite://")
                && let Some(parent) = Path::new(file).parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let store = SqliteDocumentStore::connect(&url)
                .await
                .with_context(|| format!("failed to open brain at {url}"))?;
            info!(url = %url, "using sqlite brain");
            Brain::new(Arc::new(store))
        },
    };
    let policy = match config.write_policy {
        WritePolicyKind::LastWriteWins => WritePolicy::LastWriteWins,
        WritePolicyKind::Optimistic => WritePolicy::Optimistic {
            max_attempts: config.max_write_attempts,
        },
    };
    Ok(brain.with_write_policy(policy))
}

async fn health_handler(State(robot): State<Arc<Robot>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "name": robot.config().name,
        "version": env!("CARGO_PKG_VERSION"),
        "adapters": robot.registry().list(),
        "listeners": robot.listener_count(),
    }))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::{
        sync::Mutex,
        time::Duration,
    };

    use {
        super::*,
        axum::{
            body::Body,
            http::{Request, StatusCode, header},
        },
        nurph_brain::Namespace,
        nurph_robot::Response,
        serde_json::{Value, json},
        tower::ServiceExt,
    };

    fn twilio_config(api_base: &str) -> NurphConfig {
        let mut config = NurphConfig::default();
        config.adapters.twilio = Some(json!({
            "account_sid": "AC123",
            "auth_token": "secret",
            "from_number": "+15550000000",
            "api_base": api_base,
        }));
        config
    }

    #[tokio::test]
    async fn sms_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("To".into(), "+15551234567".into()),
                mockito::Matcher::UrlEncoded("From".into(), "+15550000000".into()),
                mockito::Matcher::UrlEncoded("Body".into(), "hello!".into()),
            ]))
            .with_status(201)
            .with_body(r#"{"sid":"SM9"}"#)
            .create_async()
            .await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let app = App::build(&twilio_config(&server.url()), |robot| {
            let seen = Arc::clone(&seen);
            robot.respond("(?i)^hi", move |res: Response| {
                let seen = Arc::clone(&seen);
                async move {
                    let event = res.event();
                    seen.lock().unwrap().push((
                        event.user().id.clone(),
                        event.text().to_string(),
                        event.room().to_string(),
                    ));
                    res.reply("hello!").wait().await;
                    anyhow::Ok(())
                }
            })
        })
        .await
        .unwrap();

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/twilio/sms/reply")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("Body=hi&From=%2B15551234567"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        for _ in 0..100 {
            if mock.matched_async().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        mock.assert_async().await;
        assert_eq!(seen.lock().unwrap().as_slice(), [(
            "+15551234567".to_string(),
            "Nurph: hi".to_string(),
            "+15551234567-sms".to_string(),
        )]);
    }

    #[tokio::test]
    async fn health_reports_adapters_and_listeners() {
        let app = App::build(&twilio_config("http://127.0.0.1:1"), |_| Ok(()))
            .await
            .unwrap();
        let response = app
            .router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let health: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["name"], "Nurph");
        assert_eq!(health["adapters"], json!(["twilio"]));
        assert_eq!(health["listeners"], 5);
    }

    #[tokio::test]
    async fn bad_adapter_config_fails_fast() {
        let mut config = NurphConfig::default();
        config.adapters.twilio = Some(json!({ "account_sid": "AC1" }));
        let err = App::build(&config, |_| Ok(())).await.err().unwrap();
        assert!(format!("{err:#}").contains("auth_token"));
    }

    #[tokio::test]
    async fn sqlite_brain_persists_across_builds() {
        let dir = tempfile::tempdir().unwrap();
        let config = BrainConfig {
            backend: BrainBackend::Sqlite,
            database_url: Some(format!(
                "sqlite://{}",
                dir.path().join("nested/brain.db").display()
            )),
            write_policy: WritePolicyKind::Optimistic,
            max_write_attempts: 3,
        };

        let brain = build_brain(&config).await.unwrap();
        assert_eq!(brain.write_policy(), WritePolicy::Optimistic { max_attempts: 3 });
        brain
            .set(&Namespace::Global, "greeting", json!("hi"))
            .await
            .unwrap();
        drop(brain);

        let brain = build_brain(&config).await.unwrap();
        let value = brain.get(&Namespace::Global, "greeting").await.unwrap();
        assert_eq!(value.map(|v| v.into_value()), Some(json!("hi")));
    }
}
