//! 生产计划（已校验的内存模型）
//!
//! 由 [`PlanSpec`] 构建；构建时完成全部致命错误检查，仿真期间只读。

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::spec::{
    ActivityRefSpec, ActivitySpec, EarliestStartSpec, FactorySpec, PLAN_SCHEMA_VERSION, PlanSpec,
    ProductSpec, TemporalRelationSpec,
};
use crate::error::SimError;
use crate::factory::{ActivityId, ActivityKey, Needs, ProductIndex};
use crate::sim::SimTime;

/// 前驱与后继开始时间之间允许的时滞窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemporalRelation {
    pub min_lag: u64,
    pub max_lag: Option<u64>,
}

/// 活动的一个前驱及其时滞约束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predecessor {
    pub activity: ActivityId,
    pub relation: TemporalRelation,
}

/// 计划中的一个活动
#[derive(Debug, Clone)]
pub struct PlannedActivity {
    pub id: ActivityId,
    pub processing_time: SimTime,
    pub needs: Needs,
    /// 按声明顺序
    pub predecessors: Vec<Predecessor>,
    /// 不可同时处于活跃状态的 (产品下标, 活动)
    pub incompatible_with: Vec<ActivityKey>,
}

/// 计划中的一个产品实例
#[derive(Debug, Clone)]
pub struct PlannedProduct {
    pub index: ProductIndex,
    pub product_id: u64,
    pub name: String,
    pub deadline: SimTime,
    pub activities: Vec<PlannedActivity>,
    by_id: HashMap<ActivityId, usize>,
}

impl PlannedProduct {
    pub fn activity(&self, id: ActivityId) -> Option<&PlannedActivity> {
        self.by_id.get(&id).map(|&i| &self.activities[i])
    }
}

/// 计划给出的最早开始时间（默认调度器按此派发）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarliestStart {
    pub key: ActivityKey,
    pub at: SimTime,
}

#[derive(Debug, Clone)]
pub struct ProductionPlan {
    name: String,
    factory_name: String,
    resource_names: Vec<String>,
    capacity: Vec<usize>,
    products: Vec<PlannedProduct>,
    earliest_start: Vec<EarliestStart>,
}

impl ProductionPlan {
    /// 从 JSON 文件加载并校验
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SimError> {
        let spec: PlanSpec = serde_json::from_str(raw)?;
        Self::from_spec(&spec)
    }

    #[tracing::instrument(skip(spec), fields(plan = spec.name.as_deref().unwrap_or("")))]
    pub fn from_spec(spec: &PlanSpec) -> Result<Self, SimError> {
        if spec.schema_version != PLAN_SCHEMA_VERSION {
            return Err(SimError::UnsupportedSchema(spec.schema_version));
        }
        let groups = spec.factory.resource_names.len();
        if spec.factory.capacity.len() != groups {
            return Err(SimError::PlanShape {
                names: groups,
                capacities: spec.factory.capacity.len(),
            });
        }
        if spec.deadlines.len() != spec.product_ids.len() {
            return Err(SimError::DeadlineCount {
                products: spec.product_ids.len(),
                deadlines: spec.deadlines.len(),
            });
        }

        let mut catalog: HashMap<u64, &ProductSpec> = HashMap::with_capacity(spec.products.len());
        for p in &spec.products {
            if catalog.insert(p.id, p).is_some() {
                return Err(SimError::DuplicateProduct(p.id));
            }
        }
        // 目录产品 id -> 计划中实例化它的所有下标
        let mut instances: HashMap<u64, Vec<ProductIndex>> = HashMap::new();
        for (index, id) in spec.product_ids.iter().enumerate() {
            if !catalog.contains_key(id) {
                return Err(SimError::UnknownProduct(*id));
            }
            instances.entry(*id).or_default().push(ProductIndex(index));
        }

        let mut products = Vec::with_capacity(spec.product_ids.len());
        for (index, (id, deadline)) in spec.product_ids.iter().zip(&spec.deadlines).enumerate() {
            let product = catalog[id];
            products.push(build_product(
                ProductIndex(index),
                product,
                SimTime(*deadline),
                groups,
                &catalog,
                &instances,
            )?);
        }

        for (group, (name, cap)) in spec
            .factory
            .resource_names
            .iter()
            .zip(&spec.factory.capacity)
            .enumerate()
        {
            let demanded = products
                .iter()
                .flat_map(|p| &p.activities)
                .any(|a| a.needs.0[group] > 0);
            if demanded && *cap == 0 {
                return Err(SimError::ZeroCapacity {
                    group: name.clone(),
                });
            }
        }

        let mut earliest_start = Vec::with_capacity(spec.earliest_start.len());
        for es in &spec.earliest_start {
            let Some(product) = products.get(es.product_index) else {
                return Err(SimError::UnknownProductIndex {
                    product: es.product_index,
                    products: products.len(),
                });
            };
            let key = ActivityKey::new(es.product_index, es.activity_id);
            if product.activity(key.activity).is_none() {
                return Err(SimError::UnknownActivity {
                    product: product.product_id,
                    activity: es.activity_id,
                });
            }
            earliest_start.push(EarliestStart {
                key,
                at: SimTime(es.earliest_start),
            });
        }

        let plan = Self {
            name: spec.name.clone().unwrap_or_default(),
            factory_name: spec.factory.name.clone().unwrap_or_default(),
            resource_names: spec.factory.resource_names.clone(),
            capacity: spec.factory.capacity.clone(),
            products,
            earliest_start,
        };
        info!(
            products = plan.products.len(),
            activities = plan.activity_count(),
            resource_groups = groups,
            "📋 生产计划已加载"
        );
        Ok(plan)
    }

    pub fn builder(name: impl Into<String>) -> PlanBuilder {
        PlanBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn factory_name(&self) -> &str {
        &self.factory_name
    }

    pub fn resource_names(&self) -> &[String] {
        &self.resource_names
    }

    pub fn capacity(&self) -> &[usize] {
        &self.capacity
    }

    pub fn resource_groups(&self) -> usize {
        self.resource_names.len()
    }

    pub fn products(&self) -> &[PlannedProduct] {
        &self.products
    }

    pub fn product(&self, index: ProductIndex) -> Option<&PlannedProduct> {
        self.products.get(index.0)
    }

    pub fn activity(&self, key: ActivityKey) -> Option<&PlannedActivity> {
        self.product(key.product)?.activity(key.activity)
    }

    /// 所有计划活动，按产品下标、再按活动声明顺序
    pub fn activity_keys(&self) -> impl Iterator<Item = ActivityKey> + '_ {
        self.products.iter().flat_map(|p| {
            p.activities.iter().map(move |a| ActivityKey {
                product: p.index,
                activity: a.id,
            })
        })
    }

    pub fn activity_count(&self) -> usize {
        self.products.iter().map(|p| p.activities.len()).sum()
    }

    pub fn earliest_start(&self) -> &[EarliestStart] {
        &self.earliest_start
    }
}

fn build_product(
    index: ProductIndex,
    spec: &ProductSpec,
    deadline: SimTime,
    groups: usize,
    catalog: &HashMap<u64, &ProductSpec>,
    instances: &HashMap<u64, Vec<ProductIndex>>,
) -> Result<PlannedProduct, SimError> {
    let mut by_id = HashMap::with_capacity(spec.activities.len());
    for (pos, a) in spec.activities.iter().enumerate() {
        if by_id.insert(ActivityId(a.id), pos).is_some() {
            return Err(SimError::DuplicateActivity {
                product: spec.id,
                activity: a.id,
            });
        }
        if a.needs.len() != groups {
            return Err(SimError::NeedsLength {
                product: spec.id,
                activity: a.id,
                expected: groups,
                found: a.needs.len(),
            });
        }
    }

    let mut activities: Vec<PlannedActivity> = spec
        .activities
        .iter()
        .map(|a| PlannedActivity {
            id: ActivityId(a.id),
            processing_time: SimTime(a.processing_time),
            needs: a.needs.clone(),
            predecessors: Vec::new(),
            incompatible_with: Vec::new(),
        })
        .collect();

    for rel in &spec.temporal_relations {
        for end in [rel.predecessor, rel.successor] {
            if !by_id.contains_key(&ActivityId(end)) {
                return Err(SimError::UnknownActivity {
                    product: spec.id,
                    activity: end,
                });
            }
        }
        if let Some(max_lag) = rel.max_lag.filter(|&m| m < rel.min_lag) {
            return Err(SimError::InvalidLag {
                product: spec.id,
                predecessor: rel.predecessor,
                successor: rel.successor,
                min_lag: rel.min_lag,
                max_lag,
            });
        }
        let succ = by_id[&ActivityId(rel.successor)];
        activities[succ].predecessors.push(Predecessor {
            activity: ActivityId(rel.predecessor),
            relation: TemporalRelation {
                min_lag: rel.min_lag,
                max_lag: rel.max_lag,
            },
        });
    }

    for (a, planned) in spec.activities.iter().zip(activities.iter_mut()) {
        for r in &a.incompatible_with {
            let Some(other) = catalog.get(&r.product_id) else {
                return Err(SimError::UnknownProduct(r.product_id));
            };
            if !other.activities.iter().any(|x| x.id == r.activity_id) {
                return Err(SimError::UnknownActivity {
                    product: r.product_id,
                    activity: r.activity_id,
                });
            }
            // 目录中存在但未被计划实例化的产品不会产生约束
            for &p in instances.get(&r.product_id).into_iter().flatten() {
                planned.incompatible_with.push(ActivityKey {
                    product: p,
                    activity: ActivityId(r.activity_id),
                });
            }
        }
    }

    debug!(index = index.0, product_id = spec.id, activities = activities.len(), "产品已实例化");
    Ok(PlannedProduct {
        index,
        product_id: spec.id,
        name: spec.name.clone().unwrap_or_default(),
        deadline,
        activities,
        by_id,
    })
}

/// 以代码方式构建计划：每个产品既是目录条目也是计划实例（产品 id = 产品下标）。
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    spec: PlanSpec,
}

impl PlanBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            spec: PlanSpec {
                schema_version: PLAN_SCHEMA_VERSION,
                name: Some(name.into()),
                factory: FactorySpec {
                    name: None,
                    resource_names: Vec::new(),
                    capacity: Vec::new(),
                },
                products: Vec::new(),
                product_ids: Vec::new(),
                deadlines: Vec::new(),
                earliest_start: Vec::new(),
            },
        }
    }

    /// 添加资源组，返回资源组下标
    pub fn resource(&mut self, name: impl Into<String>, capacity: usize) -> usize {
        self.spec.factory.resource_names.push(name.into());
        self.spec.factory.capacity.push(capacity);
        self.spec.factory.capacity.len() - 1
    }

    /// 添加产品，返回产品下标
    pub fn product(&mut self, name: impl Into<String>, deadline: u64) -> usize {
        let index = self.spec.products.len();
        self.spec.products.push(ProductSpec {
            id: index as u64,
            name: Some(name.into()),
            activities: Vec::new(),
            temporal_relations: Vec::new(),
        });
        self.spec.product_ids.push(index as u64);
        self.spec.deadlines.push(deadline);
        index
    }

    /// 为产品添加活动；`product` 越界时忽略。
    pub fn activity(
        &mut self,
        product: usize,
        id: usize,
        processing_time: u64,
        needs: impl Into<Needs>,
    ) -> &mut Self {
        if let Some(p) = self.spec.products.get_mut(product) {
            p.activities.push(ActivitySpec {
                id,
                processing_time,
                needs: needs.into(),
                incompatible_with: Vec::new(),
            });
        }
        self
    }

    pub fn relation(
        &mut self,
        product: usize,
        predecessor: usize,
        successor: usize,
        min_lag: u64,
        max_lag: Option<u64>,
    ) -> &mut Self {
        if let Some(p) = self.spec.products.get_mut(product) {
            p.temporal_relations.push(TemporalRelationSpec {
                predecessor,
                successor,
                min_lag,
                max_lag,
            });
        }
        self
    }

    /// 声明 `a` 与 `b` 互斥（双向登记）
    pub fn incompatible(&mut self, a: ActivityKey, b: ActivityKey) -> &mut Self {
        self.declare_incompatible(a, b);
        self.declare_incompatible(b, a);
        self
    }

    fn declare_incompatible(&mut self, on: ActivityKey, other: ActivityKey) {
        let target = ActivityRefSpec {
            product_id: other.product.0 as u64,
            activity_id: other.activity.0,
        };
        let activity = self
            .spec
            .products
            .get_mut(on.product.0)
            .and_then(|p| p.activities.iter_mut().find(|a| a.id == on.activity.0));
        if let Some(a) = activity {
            a.incompatible_with.push(target);
        }
    }

    pub fn earliest_start(&mut self, key: ActivityKey, at: u64) -> &mut Self {
        self.spec.earliest_start.push(EarliestStartSpec {
            product_index: key.product.0,
            activity_id: key.activity.0,
            earliest_start: at,
        });
        self
    }

    pub fn spec(&self) -> &PlanSpec {
        &self.spec
    }

    pub fn build(&self) -> Result<ProductionPlan, SimError> {
        ProductionPlan::from_spec(&self.spec)
    }
}
