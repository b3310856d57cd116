//! Checkout scenarios against an in-memory store.
//!
//! Overselling is intentional behavior: a sale or adjustment that would
//! take stock below zero clamps the level at zero instead of rejecting.
//! The assertions here rely on that, they are not documenting a bug.

use rust_decimal::Decimal;

use almacen_core::{Category, Money, MovementKind, PaymentMethod, ProductDraft, Unit};
use almacen_service::{ClientRef, ErrorCode, StoreConfig, StoreService};

async fn service() -> StoreService {
    let _ = tracing_subscriber::fmt().with_env_filter("warn").try_init();
    StoreService::connect(StoreConfig::in_memory()).await.unwrap()
}

fn draft(name: &str, sell: i64, stock: i64) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        category: Category::Almacen,
        unit: Unit::Unidad,
        cost_price: Money::from_major(sell / 2),
        sell_price: Money::from_major(sell),
        stock: Decimal::from(stock),
        min_stock: Decimal::from(5),
    }
}

#[tokio::test]
async fn connect_starts_with_empty_mirrors() {
    let service = StoreService::connect(StoreConfig::in_memory().store_name("Almacén Don José"))
        .await
        .unwrap();

    assert_eq!(service.store_name(), "Almacén Don José");
    assert!(service.products().is_empty());
    assert!(service.clients().is_empty());
    assert!(service.sales().is_empty());
    assert!(service.stock_movements().is_empty());
    assert!(service.cart().is_empty());
}

#[tokio::test]
async fn cash_sale_commits_items_stock_and_ledger() {
    let service = service().await;
    let coca = service.create_product(&draft("Coca-Cola 1.5L", 1800, 24)).await.unwrap();
    let fideos = service.create_product(&draft("Fideos Matarazzo 500g", 950, 30)).await.unwrap();

    service.add_to_cart(&coca.id).unwrap();
    service.add_to_cart(&coca.id).unwrap();
    service.add_to_cart(&fideos.id).unwrap();
    assert_eq!(service.cart_total(), Money::from_major(4550));

    let sale = service.checkout(PaymentMethod::Efectivo, None).await.unwrap();

    assert_eq!(sale.total, Money::from_major(4550));
    assert_eq!(sale.items.len(), 2);
    assert!(sale.client_id.is_none());

    // Cart cleared, sale prepended to the mirror
    assert!(service.cart().is_empty());
    assert_eq!(service.sales()[0].id, sale.id);

    // Stock decremented per item
    assert_eq!(service.product(&coca.id).unwrap().stock, Decimal::from(22));
    assert_eq!(service.product(&fideos.id).unwrap().stock, Decimal::from(29));

    // Exactly one venta movement per item, quantity = -item quantity
    let movements = service.stock_movements();
    assert_eq!(movements.len(), 2);
    assert!(movements.iter().all(|m| m.kind == MovementKind::Venta));
    assert_eq!(
        service.stock_movements_for(&coca.id)[0].quantity,
        Decimal::from(-2)
    );
    assert_eq!(
        service.stock_movements_for(&fideos.id)[0].quantity,
        Decimal::from(-1)
    );

    // No client was touched by a cash sale
    assert!(service.clients().is_empty());

    // Mirror and store agree
    let stored = service
        .store()
        .products()
        .get_by_id(&coca.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.stock, Decimal::from(22));
}

#[tokio::test]
async fn fiado_sale_increases_debt_and_appends_purchase() {
    let service = service().await;
    let alfajor = service.create_product(&draft("Alfajor Havanna", 900, 3)).await.unwrap();
    let golosinas = service.create_product(&draft("Caramelos Sugus x10", 900, 50)).await.unwrap();
    let carlos = service.create_client("Carlos Ruiz", Some("11-5678-9012")).await.unwrap();

    // A first fiado sale leaves Carlos owing 1800
    service.add_to_cart(&golosinas.id).unwrap();
    service.set_cart_quantity(&golosinas.id, Decimal::from(2));
    service
        .checkout(PaymentMethod::Fiado, Some(ClientRef::Existing(carlos.id.clone())))
        .await
        .unwrap();
    assert_eq!(service.client(&carlos.id).unwrap().debt, Money::from_major(1800));

    // Two alfajores on fiado: stock 3 → 1, debt 1800 → 3600
    service.add_to_cart(&alfajor.id).unwrap();
    service.set_cart_quantity(&alfajor.id, Decimal::from(2));
    let sale = service
        .checkout(PaymentMethod::Fiado, Some(ClientRef::Existing(carlos.id.clone())))
        .await
        .unwrap();

    assert_eq!(sale.client_id.as_deref(), Some(carlos.id.as_str()));
    assert_eq!(service.product(&alfajor.id).unwrap().stock, Decimal::from(1));

    let updated = service.client(&carlos.id).unwrap();
    assert_eq!(updated.debt, Money::from_major(3600));
    assert_eq!(updated.purchases.len(), 2);
    assert_eq!(updated.purchases[1].amount, Money::from_major(1800));
    assert_eq!(updated.purchases[1].detail, "Alfajor Havanna");
}

#[tokio::test]
async fn oversell_clamps_stock_at_zero_but_commits_the_sale() {
    let service = service().await;
    let queso = service.create_product(&draft("Queso cremoso", 6000, 1)).await.unwrap();

    service.add_to_cart(&queso.id).unwrap();
    service.set_cart_quantity(&queso.id, Decimal::from(3));

    let sale = service.checkout(PaymentMethod::Efectivo, None).await.unwrap();

    // Sale goes through at full price; stock bottoms out at zero
    assert_eq!(sale.total, Money::from_major(18000));
    assert_eq!(service.product(&queso.id).unwrap().stock, Decimal::ZERO);

    // The ledger records the requested -3, not the clamped -1
    let movements = service.stock_movements_for(&queso.id);
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].quantity, Decimal::from(-3));
}

#[tokio::test]
async fn fractional_quantities_sell_exactly() {
    let service = service().await;
    let mut jamon_draft = draft("Jamón cocido", 7200, 5);
    jamon_draft.unit = Unit::Kg;
    jamon_draft.category = Category::Fiambreria;
    let jamon = service.create_product(&jamon_draft).await.unwrap();

    service.add_to_cart(&jamon.id).unwrap();
    service.set_cart_quantity(&jamon.id, Decimal::new(5, 1)); // 0.5 kg

    let sale = service.checkout(PaymentMethod::Efectivo, None).await.unwrap();

    assert_eq!(sale.total, Money::from_major(3600));
    assert_eq!(
        service.product(&jamon.id).unwrap().stock,
        Decimal::new(45, 1) // 4.5 kg
    );
}

#[tokio::test]
async fn fiado_with_new_client_creates_then_charges() {
    let service = service().await;
    let pan = service.create_product(&draft("Pan lactal Bimbo", 1400, 10)).await.unwrap();

    service.add_to_cart(&pan.id).unwrap();
    let sale = service
        .checkout(
            PaymentMethod::Fiado,
            Some(ClientRef::New {
                name: "Ana López".to_string(),
                phone: None,
            }),
        )
        .await
        .unwrap();

    let clients = service.clients();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].name, "Ana López");
    assert_eq!(clients[0].debt, Money::from_major(1400));
    assert_eq!(sale.client_id.as_deref(), Some(clients[0].id.as_str()));
}

#[tokio::test]
async fn empty_cart_is_rejected_before_any_write() {
    let service = service().await;

    let err = service.checkout(PaymentMethod::Efectivo, None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(service.sales().is_empty());
    assert!(service.store().sales().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn fiado_without_client_is_rejected() {
    let service = service().await;
    let coca = service.create_product(&draft("Coca-Cola 1.5L", 1800, 24)).await.unwrap();
    service.add_to_cart(&coca.id).unwrap();

    let err = service.checkout(PaymentMethod::Fiado, None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    // Nothing persisted, cart intact for a retry with a client
    assert!(service.sales().is_empty());
    assert_eq!(service.cart().len(), 1);
    assert_eq!(service.product(&coca.id).unwrap().stock, Decimal::from(24));
}

#[tokio::test]
async fn fiado_with_unknown_client_rolls_back() {
    let service = service().await;
    let coca = service.create_product(&draft("Coca-Cola 1.5L", 1800, 24)).await.unwrap();
    service.add_to_cart(&coca.id).unwrap();

    let err = service
        .checkout(
            PaymentMethod::Fiado,
            Some(ClientRef::Existing("c99".to_string())),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    assert!(service.sales().is_empty());
    assert!(service.stock_movements().is_empty());
    assert_eq!(service.product(&coca.id).unwrap().stock, Decimal::from(24));
}

#[tokio::test]
async fn non_fiado_sale_ignores_client_ref() {
    let service = service().await;
    let coca = service.create_product(&draft("Coca-Cola 1.5L", 1800, 24)).await.unwrap();
    let maria = service.create_client("María González", None).await.unwrap();

    service.add_to_cart(&coca.id).unwrap();
    let sale = service
        .checkout(
            PaymentMethod::Tarjeta,
            Some(ClientRef::Existing(maria.id.clone())),
        )
        .await
        .unwrap();

    assert!(sale.client_id.is_none());
    let unchanged = service.client(&maria.id).unwrap();
    assert_eq!(unchanged.debt, Money::zero());
    assert!(unchanged.purchases.is_empty());
}

#[tokio::test]
async fn adjust_stock_clamps_level_but_logs_requested_delta() {
    let service = service().await;
    let jabon = service.create_product(&draft("Jabón en polvo Skip 800g", 2400, 4)).await.unwrap();

    let updated = service
        .adjust_stock(&jabon.id, Decimal::from(-5), Some("Se rompió una caja"))
        .await
        .unwrap();

    assert_eq!(updated.stock, Decimal::ZERO);

    let movements = service.stock_movements_for(&jabon.id);
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].kind, MovementKind::Ajuste);
    assert_eq!(movements[0].quantity, Decimal::from(-5));
    assert_eq!(movements[0].reason.as_deref(), Some("Se rompió una caja"));
}

#[tokio::test]
async fn adjust_stock_defaults_reason_by_direction() {
    let service = service().await;
    let leche = service.create_product(&draft("Leche La Serenísima 1L", 1200, 12)).await.unwrap();

    service.adjust_stock(&leche.id, Decimal::from(12), None).await.unwrap();
    service.adjust_stock(&leche.id, Decimal::from(-1), None).await.unwrap();

    let movements = service.stock_movements_for(&leche.id);
    assert_eq!(movements[0].kind, MovementKind::Ingreso);
    assert_eq!(movements[0].reason.as_deref(), Some("Ingreso de mercadería"));
    assert_eq!(movements[1].kind, MovementKind::Ajuste);
    assert_eq!(movements[1].reason.as_deref(), Some("Ajuste de stock"));
}

#[tokio::test]
async fn adjust_stock_unknown_product_is_not_found() {
    let service = service().await;

    let err = service
        .adjust_stock("p99", Decimal::from(3), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert!(service.stock_movements().is_empty());
}

#[tokio::test]
async fn overpayment_settles_debt_at_zero() {
    let service = service().await;
    let cerveza = service.create_product(&draft("Cerveza Quilmes 1L", 1600, 20)).await.unwrap();
    let roberto = service.create_client("Roberto Sánchez", None).await.unwrap();

    service.add_to_cart(&cerveza.id).unwrap();
    service
        .checkout(PaymentMethod::Fiado, Some(ClientRef::Existing(roberto.id.clone())))
        .await
        .unwrap();
    assert_eq!(service.client(&roberto.id).unwrap().debt, Money::from_major(1600));

    let updated = service
        .register_payment(&roberto.id, Money::from_major(5000))
        .await
        .unwrap();

    assert_eq!(updated.debt, Money::zero());
    assert_eq!(updated.payments.len(), 1);
    assert_eq!(updated.payments[0].amount, Money::from_major(5000));
}

#[tokio::test]
async fn non_positive_payment_is_rejected() {
    let service = service().await;
    let ana = service.create_client("Ana López", None).await.unwrap();

    let err = service.register_payment(&ana.id, Money::zero()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(service.client(&ana.id).unwrap().payments.is_empty());
}

#[tokio::test]
async fn today_summary_counts_committed_sales() {
    let service = service().await;
    let coca = service.create_product(&draft("Coca-Cola 1.5L", 1800, 24)).await.unwrap();

    service.add_to_cart(&coca.id).unwrap();
    service.checkout(PaymentMethod::Efectivo, None).await.unwrap();
    service.add_to_cart(&coca.id).unwrap();
    service.add_to_cart(&coca.id).unwrap();
    service.checkout(PaymentMethod::Transferencia, None).await.unwrap();

    let summary = service.today_summary();
    assert_eq!(summary.count, 2);
    assert_eq!(summary.total, Money::from_major(5400));
}

#[tokio::test]
async fn low_stock_listing_tracks_threshold() {
    let service = service().await;
    let alfajor = service.create_product(&draft("Alfajor Havanna", 900, 6)).await.unwrap();
    assert!(service.low_stock_products().is_empty());

    service.add_to_cart(&alfajor.id).unwrap();
    service.set_cart_quantity(&alfajor.id, Decimal::from(2));
    service.checkout(PaymentMethod::Efectivo, None).await.unwrap();

    // stock 4 ≤ min 5
    let low = service.low_stock_products();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].id, alfajor.id);
}
