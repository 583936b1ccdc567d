//! End-to-end runs of the provisioning workflow against the gateway double

use sqlmi_cloud::testing::{CreateBehavior, FakeGateway, GetBehavior, sample_request};
use sqlmi_cloud::{
    CancellationToken, GatewayError, GatewayStatus, IdentityDescriptor, LicenseType,
    Orchestrator, Phase, ProvisionError, ResourceIdentity, Sku,
};
use std::sync::Arc;

/// rg1/sqlmi1 が存在しない場合、作成されたモデルが返ること
#[tokio::test]
async fn test_create_when_absent() {
    let gateway = Arc::new(FakeGateway::new());
    let orchestrator = Orchestrator::new(gateway.clone());

    let mut request = sample_request();
    request.sku = "GeneralPurpose-Gen5".parse::<Sku>().unwrap();
    request.license_type = "LicenseIncluded".parse::<LicenseType>().unwrap();

    let report = orchestrator
        .execute(request, &CancellationToken::new())
        .await;
    assert_eq!(report.phase(), Phase::Done);

    let instance = report.into_result().unwrap();
    assert_eq!(instance.name, "sqlmi1");
    assert!(instance.matches(&ResourceIdentity::new("rg1", "sqlmi1").unwrap()));
    assert_eq!(instance.resource_group.as_deref(), Some("rg1"));
    assert_eq!(instance.storage_size_gb, Some(32));
    assert_eq!(instance.v_cores, Some(4));
    assert_eq!(instance.license_type.as_deref(), Some("LicenseIncluded"));
    assert_eq!(instance.sku.unwrap().name, "GP_Gen5");

    assert_eq!(gateway.get_calls(), 1);
    assert_eq!(gateway.create_calls(), 1);
}

/// 既存リソースがある場合は ResourceAlreadyExists となり、作成は呼ばれないこと
#[tokio::test]
async fn test_conflict_when_present() {
    let gateway = Arc::new(FakeGateway::new().with_get(GetBehavior::Existing));
    let orchestrator = Orchestrator::new(gateway.clone());

    let err = orchestrator.run(sample_request()).await.unwrap_err();

    match err {
        ProvisionError::ResourceAlreadyExists(identity) => {
            assert_eq!(identity.name(), "sqlmi1");
            assert_eq!(identity.resource_group(), "rg1");
        }
        other => panic!("Expected ResourceAlreadyExists, got {:?}", other),
    }
    assert_eq!(gateway.create_calls(), 0);
}

/// not found 以外のプローブ失敗は、そのまま伝播すること
#[tokio::test]
async fn test_probe_failure_is_propagated_verbatim() {
    let message = "ERROR: (AuthorizationFailed) The client 'x' does not have authorization to perform action 'Microsoft.Sql/managedInstances/read'.";
    let original = GatewayError::new(GatewayStatus::Forbidden, message).with_code("AuthorizationFailed");
    let gateway = Arc::new(FakeGateway::new().with_get(GetBehavior::Fail(original.clone())));
    let orchestrator = Orchestrator::new(gateway.clone());

    let report = orchestrator
        .execute(sample_request(), &CancellationToken::new())
        .await;

    assert_eq!(report.trail, vec![Phase::Start, Phase::Checking, Phase::Failed]);
    let err = report.into_result().unwrap_err();
    assert_eq!(err.to_string(), message);
    match err {
        ProvisionError::Gateway(e) => assert_eq!(e, original),
        other => panic!("Expected gateway error, got {:?}", other),
    }
    assert_eq!(gateway.create_calls(), 0);
}

/// 大文字小文字違いの重複タグは、ゲートウェイを呼ぶ前に InvalidTag になること
#[tokio::test]
async fn test_duplicate_tags_fail_before_any_gateway_call() {
    let gateway = Arc::new(FakeGateway::new());
    let orchestrator = Orchestrator::new(gateway.clone());

    let mut request = sample_request();
    request.tags = vec![
        ("Env".to_string(), "x".to_string()),
        ("env".to_string(), "y".to_string()),
    ];

    let err = orchestrator.run(request).await.unwrap_err();

    assert!(matches!(err, ProvisionError::InvalidTag(_)));
    assert!(err.is_input_error());
    assert_eq!(gateway.get_calls(), 0);
    assert_eq!(gateway.create_calls(), 0);
}

/// マネージド ID の割り当てフラグが desired state に反映されること
#[tokio::test]
async fn test_identity_assignment_reaches_gateway() {
    let gateway = Arc::new(FakeGateway::new());
    let orchestrator = Orchestrator::new(gateway.clone());

    let mut request = sample_request();
    request.assign_identity = true;
    let instance = orchestrator.run(request).await.unwrap();

    let desired = gateway.last_desired().unwrap();
    assert_eq!(desired.assigned_identity(), IdentityDescriptor::SystemAssigned);
    assert_eq!(instance.identity.unwrap().kind, "SystemAssigned");
}

/// 作成失敗はリトライされず、そのまま返ること
#[tokio::test]
async fn test_create_failure_is_propagated() {
    let original = GatewayError::new(
        GatewayStatus::Rejected,
        "(ProvisioningDisabled) Subscription does not have quota for managed instances.",
    );
    let gateway = Arc::new(
        FakeGateway::new().with_create(CreateBehavior::Fail(original.clone())),
    );
    let orchestrator = Orchestrator::new(gateway.clone());

    let err = orchestrator.run(sample_request()).await.unwrap_err();

    assert!(matches!(err, ProvisionError::Gateway(ref e) if *e == original));
    assert_eq!(gateway.create_calls(), 1);
}

/// 2 回目の実行は既存リソースとして検出されること
#[tokio::test]
async fn test_second_run_reports_conflict() {
    let first = Arc::new(FakeGateway::new());
    Orchestrator::new(first.clone())
        .run(sample_request())
        .await
        .unwrap();

    // The control plane now has the instance
    let second = Arc::new(FakeGateway::new().with_get(GetBehavior::Existing));
    let err = Orchestrator::new(second.clone())
        .run(sample_request())
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::ResourceAlreadyExists(_)));
    assert_eq!(second.create_calls(), 0);
}
