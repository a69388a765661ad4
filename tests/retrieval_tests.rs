use permit_service::application::response::HttpStatus;
use permit_service::domain::context::CallerContext;
use permit_service::infrastructure::simulated::{Behavior, PaymentSimulation};
use uuid::Uuid;

mod common;
use common::{Downstream, service};

#[tokio::test]
async fn test_get_enriches_with_recorded_payments() {
    let svc = common::healthy_service();
    let request = common::request();
    let uuid = request.transaction_uuid;
    let ctx = CallerContext::default();

    assert!(svc.orchestrator.create_transaction(&ctx, request).await.is_ok());

    let reply = svc
        .orchestrator
        .get_transaction(&ctx, uuid, common::CUSTOMER_ID)
        .await;

    assert_eq!(reply.http_status, HttpStatus::Ok);
    let body = reply.body.unwrap();
    assert_eq!(body["transactionUuid"], uuid.to_string());
    assert_eq!(body["plateNumber"], "P123");
    assert_eq!(body["transactionType"]["label"], "CHARGE");
    let payments = body["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["processorTransactionId"], "12");
}

#[tokio::test]
async fn test_get_degrades_when_payment_lookup_fails() {
    for lookup in [Behavior::Unavailable, Behavior::Reject { status: 503 }] {
        let svc = service(Downstream {
            payments: PaymentSimulation {
                record: Behavior::Succeed,
                lookup,
            },
            ..Downstream::default()
        });
        let request = common::request();
        let uuid = request.transaction_uuid;
        let ctx = CallerContext::default();
        assert!(svc.orchestrator.create_transaction(&ctx, request).await.is_ok());

        let reply = svc
            .orchestrator
            .get_transaction(&ctx, uuid, common::CUSTOMER_ID)
            .await;

        assert_eq!(reply.http_status, HttpStatus::Ok);
        let body = reply.body.unwrap();
        assert_eq!(body["transactionUuid"], uuid.to_string());
        assert!(body.get("payments").is_none());
    }
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let svc = common::healthy_service();

    let reply = svc
        .orchestrator
        .get_transaction(&CallerContext::default(), Uuid::new_v4(), common::CUSTOMER_ID)
        .await;

    assert_eq!(reply.http_status, HttpStatus::NotFound);
    assert!(reply.body.is_none());
    assert_eq!(svc.payments.call_counter().get(), 0);
}

#[tokio::test]
async fn test_get_is_scoped_to_customer() {
    let svc = common::healthy_service();
    let request = common::request();
    let uuid = request.transaction_uuid;
    let ctx = CallerContext::default();
    assert!(svc.orchestrator.create_transaction(&ctx, request).await.is_ok());

    let reply = svc.orchestrator.get_transaction(&ctx, uuid, 77).await;

    assert_eq!(reply.http_status, HttpStatus::NotFound);
}
