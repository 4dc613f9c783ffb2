mod utils;
#[allow(unused)]
use utils::*;

use fanbench::ProductClient;
use mock_service::MockConfig;

#[tokio::test(flavor = "multi_thread")]
async fn seeding_is_additive_not_upserting() {
    let base_url = spawn_mock(MockConfig::instant()).await;
    let products = ProductClient::new(&base_url);

    products.seed(25).await.expect("first seed failed");
    products.seed(25).await.expect("second seed failed");

    let listed = products.list().await.expect("list failed");
    assert_eq!(listed.len(), 50);

    // Ids keep counting up across batches.
    assert_eq!(listed.first().map(|p| p.id), Some(1));
    assert_eq!(listed.last().map(|p| p.id), Some(50));

    let first = products.get(1).await.expect("get failed");
    assert_eq!(first.name, "Product 1");
}
