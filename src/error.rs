//! 致命错误
//!
//! 约束检查失败（FailureCode）属于正常的仿真结果，不走这里；
//! 这里只收录会终止整个运行的错误：计划数据畸形、派发非法、I/O。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("unsupported plan schema_version {0} (expected 1)")]
    UnsupportedSchema(u32),

    #[error("factory declares {names} resource names but {capacities} capacities")]
    PlanShape { names: usize, capacities: usize },

    #[error("plan instantiates {products} products but lists {deadlines} deadlines")]
    DeadlineCount { products: usize, deadlines: usize },

    #[error("unknown product id {0}")]
    UnknownProduct(u64),

    #[error("product {product}: unknown activity {activity}")]
    UnknownActivity { product: u64, activity: usize },

    #[error("product id {0} appears more than once in the catalog")]
    DuplicateProduct(u64),

    #[error("product {product}: activity {activity} declared more than once")]
    DuplicateActivity { product: u64, activity: usize },

    #[error(
        "product {product}, activity {activity}: needs vector has {found} entries, factory has {expected} resource groups"
    )]
    NeedsLength {
        product: u64,
        activity: usize,
        expected: usize,
        found: usize,
    },

    #[error("resource group {group:?} has capacity 0 but is demanded by the plan")]
    ZeroCapacity { group: String },

    #[error(
        "product {product}: relation {predecessor}->{successor} has max_lag {max_lag} below min_lag {min_lag}"
    )]
    InvalidLag {
        product: u64,
        predecessor: usize,
        successor: usize,
        min_lag: u64,
        max_lag: u64,
    },

    #[error("earliest-start entry references product index {product}, plan has {products}")]
    UnknownProductIndex { product: usize, products: usize },

    #[error("operator dispatched ({product}, {activity}) which is not part of the plan")]
    UnknownDispatch { product: usize, activity: usize },

    #[error(
        "operator dispatched ({product}, {activity}) with {found} needs entries, factory has {expected} resource groups"
    )]
    DispatchNeeds {
        product: usize,
        activity: usize,
        expected: usize,
        found: usize,
    },

    #[error("operator kept asking again at {at} without dispatching ({ticks} idle ticks)")]
    DispatchStalled { at: u64, ticks: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
