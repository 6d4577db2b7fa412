use std::{sync::Arc, time::Duration};

use axum::{
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use common::{
    config::Config,
    contract::{poller::DashboardPoller, Portal},
};
use futures_util::{stream, Stream, StreamExt};
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

/// Stream dashboard state changes as server-sent events.
///
/// Every connection owns its own poller, which is stopped as soon as the
/// client disconnects and the event stream is dropped.
pub(super) async fn stream(
    Extension(portal): Extension<Arc<Portal>>,
    Extension(config): Extension<Arc<Config>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    debug!("dashboard stream opened");

    let poller = DashboardPoller::spawn(
        portal,
        Duration::from_secs(config.dashboard.refresh_interval.get()),
    );
    let updates = WatchStream::new(poller.subscribe());

    let events = stream::unfold((poller, updates), |(poller, mut updates)| async move {
        let state = updates.next().await?;
        let event = Event::default()
            .event("metrics")
            .json_data(state)
            .map_err(axum::Error::new);

        Some((event, (poller, updates)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use common::contract::{mock::MockChain, AdminPortal::getDashboardMetricsCall};
    use hyper::body::HttpBody;
    use tower::ServiceExt;

    use crate::testing::{create_database, create_session, router};

    #[tokio::test]
    async fn stream_metrics() {
        let chain = Arc::new(MockChain::new());
        let db = create_database().await;
        let token = create_session(&db, chain.owner()).await;

        let response = router(db, &chain)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/admin/dashboard/stream")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream");

        let mut body = response.into_body();
        let mut frames = Vec::new();

        while let Some(frame) = body.data().await {
            let frame = String::from_utf8(frame.unwrap().to_vec()).unwrap();
            let ready = frame.contains(r#""state":"ready""#);
            frames.push(frame);

            if ready {
                break;
            }
        }

        assert!(frames[0].starts_with("event:metrics\n"));
        assert!(frames[0].contains(r#""state":"loading""#));
        assert!(frames.last().unwrap().contains(r#""total_varieties":0"#));

        drop(body);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(chain.calls::<getDashboardMetricsCall>(), 1);
    }

    #[tokio::test]
    async fn stream_requires_admin() {
        let chain = Arc::new(MockChain::new());

        let response = router(create_database().await, &chain)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/admin/dashboard/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}
