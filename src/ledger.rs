//! Expense ledger
//!
//! Ordered, owned collection of purchase records (newest first). Every
//! successful mutation is written through to the backing [`LedgerStore`].
//! A failed write is logged and remembered as a warning but never undoes the
//! in-memory change.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::db::{DbResult, LedgerStore};
use crate::models::{normalize_category, PurchaseInput, PurchaseRecord};
use crate::nutrition::{compute_nutrition, NutritionError};

/// Input rejected before any mutation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("quantity must be greater than 0, got {0}")]
    NonPositiveQuantity(f64),

    #[error("cost cannot be negative, got {0}")]
    NegativeCost(f64),

    #[error("{0} cannot be empty")]
    MissingField(&'static str),

    #[error(transparent)]
    Nutrition(#[from] NutritionError),
}

/// Ledger operation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("Invalid purchase: {0}")]
    Validation(#[from] ValidationError),

    #[error("Purchase not found with id: {0}")]
    NotFound(u64),

    #[error("No purchase ids left after {0}")]
    IdsExhausted(u64),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// One state of one open ledger. Two ledgers never share a value, even when
/// both have seen the same number of mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedgerRevision {
    pub instance: u64,
    pub count: u64,
}

/// The purchase ledger
pub struct Ledger<S: LedgerStore> {
    records: Vec<PurchaseRecord>,
    store: S,
    last_id: u64,
    revision: LedgerRevision,
    persist_warning: Option<String>,
}

impl<S: LedgerStore> Ledger<S> {
    /// Load the ledger from its store
    pub fn open(store: S) -> DbResult<Self> {
        let records = store.load()?;
        let last_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        tracing::info!("Loaded purchase ledger with {} record(s)", records.len());

        Ok(Self {
            records,
            store,
            last_id,
            revision: LedgerRevision {
                instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
                count: 0,
            },
            persist_warning: None,
        })
    }

    /// Records in stored order, newest first
    pub fn list(&self) -> &[PurchaseRecord] {
        &self.records
    }

    pub fn get(&self, id: u64) -> Option<&PurchaseRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Changes on every mutation
    pub fn revision(&self) -> LedgerRevision {
        self.revision
    }

    /// Message from the most recent failed write, cleared by the next good one
    pub fn persist_warning(&self) -> Option<&str> {
        self.persist_warning.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Log a new purchase now
    pub fn add(&mut self, input: &PurchaseInput) -> LedgerResult<PurchaseRecord> {
        self.add_at(input, Utc::now())
    }

    /// Log a new purchase with an explicit creation time
    pub fn add_at(
        &mut self,
        input: &PurchaseInput,
        now: DateTime<Utc>,
    ) -> LedgerResult<PurchaseRecord> {
        let derived = derive_fields(input)?;
        let id = self.next_id(now)?;

        let record = PurchaseRecord {
            id,
            food_name: input.food.name.clone(),
            brand: input.food.brand.clone(),
            category: input.category(),
            unit_label: input.unit_label.clone(),
            quantity: input.quantity,
            cost: input.cost,
            unit_price: derived.unit_price,
            total_calories: derived.totals.calories,
            total_protein: derived.totals.protein,
            total_fat: derived.totals.fat,
            total_carbs: derived.totals.carbs,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        self.records.insert(0, record.clone());
        tracing::info!("Added purchase {} ({} {})", id, record.brand, record.food_name);
        self.commit();
        Ok(record)
    }

    /// Replace every field of a purchase except its id and creation time.
    /// Position in the ledger is unchanged.
    pub fn update(&mut self, id: u64, input: &PurchaseInput) -> LedgerResult<PurchaseRecord> {
        let index = self.index_of(id)?;
        let derived = derive_fields(input)?;

        let record = &mut self.records[index];
        record.food_name = input.food.name.clone();
        record.brand = input.food.brand.clone();
        record.category = input.category();
        record.unit_label = input.unit_label.clone();
        record.quantity = input.quantity;
        record.cost = input.cost;
        record.unit_price = derived.unit_price;
        record.total_calories = derived.totals.calories;
        record.total_protein = derived.totals.protein;
        record.total_fat = derived.totals.fat;
        record.total_carbs = derived.totals.carbs;
        let updated = record.clone();

        tracing::info!("Updated purchase {}", id);
        self.commit();
        Ok(updated)
    }

    /// Delete a purchase by id
    pub fn remove(&mut self, id: u64) -> LedgerResult<()> {
        let index = self.index_of(id)?;
        self.records.remove(index);
        tracing::info!("Removed purchase {}", id);
        self.commit();
        Ok(())
    }

    /// Merge externally exported records (e.g. a legacy dashboard backup).
    ///
    /// Records whose id is already present, or whose quantity or cost is
    /// invalid, are skipped. The merged ledger is ordered newest first by
    /// timestamp. Returns the number of records added.
    pub fn import(&mut self, incoming: Vec<PurchaseRecord>) -> usize {
        let mut added = 0;
        for mut record in incoming {
            if self.get(record.id).is_some() {
                tracing::debug!("Skipping import of existing purchase {}", record.id);
                continue;
            }
            if !(record.quantity.is_finite() && record.quantity > 0.0)
                || !(record.cost.is_finite() && record.cost >= 0.0)
            {
                tracing::warn!("Skipping import of invalid purchase {}", record.id);
                continue;
            }
            record.category = normalize_category(Some(&record.category));
            self.last_id = self.last_id.max(record.id);
            self.records.push(record);
            added += 1;
        }

        if added > 0 {
            self.records.sort_by_cached_key(|r| {
                Reverse((parse_timestamp(&r.timestamp), r.timestamp.clone()))
            });
            tracing::info!("Imported {} purchase(s)", added);
            self.commit();
        }
        added
    }

    /// Final save on shutdown
    pub fn close(self) -> DbResult<()> {
        self.store.save(&self.records)
    }

    fn index_of(&self, id: u64) -> LedgerResult<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or(LedgerError::NotFound(id))
    }

    /// Millisecond creation time, bumped past the last issued id if needed
    fn next_id(&mut self, now: DateTime<Utc>) -> LedgerResult<u64> {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let after_last = self
            .last_id
            .checked_add(1)
            .ok_or(LedgerError::IdsExhausted(self.last_id))?;
        let id = millis.max(after_last);
        self.last_id = id;
        Ok(id)
    }

    fn commit(&mut self) {
        self.revision.count += 1;
        match self.store.save(&self.records) {
            Ok(()) => self.persist_warning = None,
            Err(e) => {
                tracing::warn!("Failed to persist purchase ledger: {}", e);
                self.persist_warning = Some(format!("Changes were not saved: {}", e));
            }
        }
    }
}

/// Unparseable timestamps sort as oldest
fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

struct DerivedFields {
    unit_price: f64,
    totals: crate::models::NutritionTotals,
}

fn derive_fields(input: &PurchaseInput) -> Result<DerivedFields, ValidationError> {
    if input.food.name.trim().is_empty() {
        return Err(ValidationError::MissingField("food name"));
    }
    if input.unit_label.is_empty() {
        return Err(ValidationError::MissingField("unit"));
    }
    if !input.quantity.is_finite() || input.quantity <= 0.0 {
        return Err(ValidationError::NonPositiveQuantity(input.quantity));
    }
    if !input.cost.is_finite() || input.cost < 0.0 {
        return Err(ValidationError::NegativeCost(input.cost));
    }

    let totals = compute_nutrition(&input.food, input.quantity, &input.unit_label)?;

    Ok(DerivedFields {
        unit_price: input.cost / input.quantity,
        totals,
    })
}
