use crate::models::{
    Agent, AssignmentSnapshot, Bill, BillStatus, Booking, BookingStatus, Client, Driver, Payment,
    Vehicle,
};
use agency_core::error::AppError;
use anyhow::anyhow;
use futures::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument};
use mongodb::{
    bson::{doc, Document},
    Collection, Database, IndexModel,
};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

/// Tenant-scoped CRUD over one roster collection (clients, drivers, vehicles
/// or agents). Every query is pinned to an `agency_id`; there is no way to
/// read or write across tenants through this type.
#[derive(Clone)]
pub struct RosterStore<T> {
    collection: Collection<T>,
}

impl<T> RosterStore<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned + Unpin + Send + Sync,
{
    fn new(collection: Collection<T>) -> Self {
        Self { collection }
    }

    #[instrument(skip(self))]
    async fn init_index(&self, name: &str) -> Result<(), AppError> {
        let index = IndexModel::builder()
            .keys(doc! { "agency_id": 1, "created_at": -1 })
            .options(IndexOptions::builder().name(name.to_string()).build())
            .build();
        self.collection.create_indexes([index], None).await?;
        Ok(())
    }

    #[instrument(skip(self, record))]
    pub async fn insert(&self, record: &T) -> Result<(), AppError> {
        self.collection.insert_one(record, None).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(agency_id = %agency_id))]
    pub async fn list(&self, agency_id: &str) -> Result<Vec<T>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self
            .collection
            .find(doc! { "agency_id": agency_id }, Some(options))
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self), fields(agency_id = %agency_id, id = %id))]
    pub async fn get(&self, agency_id: &str, id: Uuid) -> Result<Option<T>, AppError> {
        let filter = doc! { "_id": id.to_string(), "agency_id": agency_id };
        Ok(self.collection.find_one(filter, None).await?)
    }

    /// Applies a `$set` patch and returns the updated record, or `None` when
    /// nothing matches in this tenant. Callers must not pass an empty patch.
    #[instrument(skip(self, patch), fields(agency_id = %agency_id, id = %id))]
    pub async fn update(
        &self,
        agency_id: &str,
        id: Uuid,
        patch: Document,
    ) -> Result<Option<T>, AppError> {
        let filter = doc! { "_id": id.to_string(), "agency_id": agency_id };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        Ok(self
            .collection
            .find_one_and_update(filter, doc! { "$set": patch }, options)
            .await?)
    }

    #[instrument(skip(self), fields(agency_id = %agency_id, id = %id))]
    pub async fn delete(&self, agency_id: &str, id: Uuid) -> Result<bool, AppError> {
        let filter = doc! { "_id": id.to_string(), "agency_id": agency_id };
        let result = self.collection.delete_one(filter, None).await?;
        Ok(result.deleted_count == 1)
    }

    #[instrument(skip(self), fields(agency_id = %agency_id))]
    pub async fn count(&self, agency_id: &str) -> Result<u64, AppError> {
        Ok(self
            .collection
            .count_documents(doc! { "agency_id": agency_id }, None)
            .await?)
    }
}

#[derive(Clone)]
pub struct AgencyRepository {
    client: mongodb::Client,
    clients: RosterStore<Client>,
    drivers: RosterStore<Driver>,
    vehicles: RosterStore<Vehicle>,
    agents: RosterStore<Agent>,
    bookings: Collection<Booking>,
    bills: Collection<Bill>,
}

impl AgencyRepository {
    /// The client handle is kept besides the collections because billing runs
    /// a multi-document transaction, which needs a session started on it.
    pub fn new(client: &mongodb::Client, db: &Database) -> Self {
        Self {
            client: client.clone(),
            clients: RosterStore::new(db.collection("clients")),
            drivers: RosterStore::new(db.collection("drivers")),
            vehicles: RosterStore::new(db.collection("vehicles")),
            agents: RosterStore::new(db.collection("agents")),
            bookings: db.collection("bookings"),
            bills: db.collection("bills"),
        }
    }

    pub fn clients(&self) -> &RosterStore<Client> {
        &self.clients
    }

    pub fn drivers(&self) -> &RosterStore<Driver> {
        &self.drivers
    }

    pub fn vehicles(&self) -> &RosterStore<Vehicle> {
        &self.vehicles
    }

    pub fn agents(&self) -> &RosterStore<Agent> {
        &self.agents
    }

    /// Initialize database indexes for tenant-scoped queries.
    #[instrument(skip(self))]
    pub async fn init_indexes(&self) -> Result<(), AppError> {
        self.clients.init_index("tenant_client_idx").await?;
        self.drivers.init_index("tenant_driver_idx").await?;
        self.vehicles.init_index("tenant_vehicle_idx").await?;
        self.agents.init_index("tenant_agent_idx").await?;

        // Compound index on (agency_id, status) for the booking board filters
        let booking_status_index = IndexModel::builder()
            .keys(doc! { "agency_id": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("tenant_booking_status_idx".to_string())
                    .build(),
            )
            .build();

        // Compound index on (agency_id, created_at) for newest-first listings
        let booking_recency_index = IndexModel::builder()
            .keys(doc! { "agency_id": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("tenant_booking_recency_idx".to_string())
                    .build(),
            )
            .build();

        self.bookings
            .create_indexes([booking_status_index, booking_recency_index], None)
            .await?;

        // Compound index on (agency_id, bill_date) for report listings
        let bill_date_index = IndexModel::builder()
            .keys(doc! { "agency_id": 1, "bill_date": -1 })
            .options(
                IndexOptions::builder()
                    .name("tenant_bill_date_idx".to_string())
                    .build(),
            )
            .build();

        // Compound index on (agency_id, booking_id) for the booking -> bill join
        let bill_booking_index = IndexModel::builder()
            .keys(doc! { "agency_id": 1, "booking_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("tenant_bill_booking_idx".to_string())
                    .build(),
            )
            .build();

        self.bills
            .create_indexes([bill_date_index, bill_booking_index], None)
            .await?;

        tracing::info!("Agency service indexes initialized");
        Ok(())
    }

    #[instrument(
        skip(self, booking),
        fields(agency_id = %booking.agency_id, booking_id = %booking.id)
    )]
    pub async fn create_booking(&self, booking: &Booking) -> Result<(), AppError> {
        self.bookings.insert_one(booking, None).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(agency_id = %agency_id))]
    pub async fn list_bookings(
        &self,
        agency_id: &str,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError> {
        let mut filter = doc! { "agency_id": agency_id };
        if let Some(status) = status {
            filter.insert("status", status.as_str());
        }
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self.bookings.find(filter, Some(options)).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, id), fields(agency_id = %agency_id, booking_id = %id))]
    pub async fn get_booking(&self, agency_id: &str, id: Uuid) -> Result<Option<Booking>, AppError> {
        let filter = doc! { "_id": id.to_string(), "agency_id": agency_id };
        Ok(self.bookings.find_one(filter, None).await?)
    }

    /// Fetches the bookings behind a batch of bills, keyed by id. Missing
    /// bookings are simply absent; report rendering falls back to
    /// placeholders for them.
    #[instrument(skip(self, ids), fields(agency_id = %agency_id))]
    pub async fn get_bookings_by_ids(
        &self,
        agency_id: &str,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Booking>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let id_strings: Vec<String> = ids.iter().map(Uuid::to_string).collect();
        let filter = doc! { "agency_id": agency_id, "_id": { "$in": id_strings } };
        let cursor = self.bookings.find(filter, None).await?;
        let bookings: Vec<Booking> = cursor.try_collect().await?;
        Ok(bookings.into_iter().map(|b| (b.id, b)).collect())
    }

    #[instrument(skip(self), fields(agency_id = %agency_id))]
    pub async fn count_bookings(
        &self,
        agency_id: &str,
        status: BookingStatus,
    ) -> Result<u64, AppError> {
        let filter = doc! { "agency_id": agency_id, "status": status.as_str() };
        Ok(self.bookings.count_documents(filter, None).await?)
    }

    #[instrument(skip(self), fields(agency_id = %agency_id))]
    pub async fn recent_pending_bookings(
        &self,
        agency_id: &str,
        limit: i64,
    ) -> Result<Vec<Booking>, AppError> {
        let filter = doc! { "agency_id": agency_id, "status": BookingStatus::Pending.as_str() };
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .build();
        let cursor = self.bookings.find(filter, Some(options)).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Conditionally moves a booking from `from` to `to`. Returns the updated
    /// booking, or `None` when it was no longer in `from` (a concurrent
    /// operator got there first).
    #[instrument(skip(self, id), fields(agency_id = %agency_id, booking_id = %id))]
    pub async fn update_booking_status(
        &self,
        agency_id: &str,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, AppError> {
        let filter = doc! {
            "_id": id.to_string(),
            "agency_id": agency_id,
            "status": from.as_str(),
        };
        let update = doc! { "$set": { "status": to.as_str() } };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        Ok(self
            .bookings
            .find_one_and_update(filter, update, options)
            .await?)
    }

    /// Stores the assignment snapshot and flips `Pending` to `Assigned` in a
    /// single conditional write, so double-assignment loses cleanly.
    #[instrument(
        skip(self, id, assignment),
        fields(
            agency_id = %agency_id,
            booking_id = %id,
            driver_id = %assignment.driver_id,
            vehicle_id = %assignment.vehicle_id
        )
    )]
    pub async fn assign_booking(
        &self,
        agency_id: &str,
        id: Uuid,
        assignment: &AssignmentSnapshot,
    ) -> Result<Option<Booking>, AppError> {
        let filter = doc! {
            "_id": id.to_string(),
            "agency_id": agency_id,
            "status": BookingStatus::Pending.as_str(),
        };
        let update = doc! {
            "$set": {
                "status": BookingStatus::Assigned.as_str(),
                "assignment": mongodb::bson::to_bson(assignment)?,
            }
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        Ok(self
            .bookings
            .find_one_and_update(filter, update, options)
            .await?)
    }

    /// Inserts the bill and flips its booking `Completed` to `Billed` in one
    /// transaction. Either both writes land or neither does, so a booking can
    /// never be billed twice and no bill can exist for an unbilled booking.
    #[instrument(
        skip(self, bill),
        fields(agency_id = %bill.agency_id, bill_id = %bill.id, booking_id = %bill.booking_id)
    )]
    pub async fn create_bill(&self, bill: &Bill) -> Result<(), AppError> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let filter = doc! {
            "_id": bill.booking_id.to_string(),
            "agency_id": &bill.agency_id,
            "status": BookingStatus::Completed.as_str(),
        };
        let update = doc! { "$set": { "status": BookingStatus::Billed.as_str() } };
        let result = self
            .bookings
            .update_one_with_session(filter, update, None, &mut session)
            .await?;

        if result.matched_count == 0 {
            session.abort_transaction().await?;
            return Err(AppError::Conflict(anyhow!(
                "Booking {} changed state during billing",
                bill.booking_id
            )));
        }

        self.bills
            .insert_one_with_session(bill, None, &mut session)
            .await?;
        session.commit_transaction().await?;
        Ok(())
    }

    #[instrument(skip(self), fields(agency_id = %agency_id))]
    pub async fn list_bills(
        &self,
        agency_id: &str,
        status: Option<BillStatus>,
    ) -> Result<Vec<Bill>, AppError> {
        let mut filter = doc! { "agency_id": agency_id };
        if let Some(status) = status {
            filter.insert("status", status.as_str());
        }
        let options = FindOptions::builder()
            .sort(doc! { "bill_date": -1 })
            .build();
        let cursor = self.bills.find(filter, Some(options)).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, id), fields(agency_id = %agency_id, bill_id = %id))]
    pub async fn get_bill(&self, agency_id: &str, id: Uuid) -> Result<Option<Bill>, AppError> {
        let filter = doc! { "_id": id.to_string(), "agency_id": agency_id };
        Ok(self.bills.find_one(filter, None).await?)
    }

    /// Validates and appends a payment, returning the updated bill.
    ///
    /// The balance bound is checked twice: once here against a fresh read for
    /// a precise error message, and again server-side in the update filter so
    /// two operators racing on the same bill cannot overdraw it. The balance
    /// and status recompute runs inside the update pipeline; the loser of a
    /// race matches nothing and gets a conflict.
    #[instrument(
        skip(self, payment),
        fields(agency_id = %agency_id, bill_id = %bill_id, amount = payment.amount)
    )]
    pub async fn record_payment(
        &self,
        agency_id: &str,
        bill_id: Uuid,
        payment: &Payment,
    ) -> Result<Bill, AppError> {
        let bill = self
            .get_bill(agency_id, bill_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Bill {} not found", bill_id)))?;

        if !Bill::payment_acceptable(bill.breakdown.balance_due, payment.amount) {
            return Err(AppError::BadRequest(anyhow!(
                "Invalid payment amount: {} (balance due {})",
                payment.amount,
                bill.breakdown.balance_due
            )));
        }

        let amount = payment.amount;
        let payment_bson = mongodb::bson::to_bson(payment)?;
        let filter = doc! {
            "_id": bill_id.to_string(),
            "agency_id": agency_id,
            "balance_due": { "$gte": amount },
        };
        let update = vec![doc! {
            "$set": {
                "balance_due": { "$subtract": ["$balance_due", amount] },
                "status": {
                    "$cond": [
                        { "$lte": [{ "$subtract": ["$balance_due", amount] }, 0.0] },
                        BillStatus::Paid.as_str(),
                        BillStatus::Due.as_str(),
                    ]
                },
                "payments": { "$concatArrays": ["$payments", [payment_bson]] },
            }
        }];
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self.bills.find_one_and_update(filter, update, options).await?;

        updated.ok_or_else(|| {
            AppError::Conflict(anyhow!(
                "Payment of {} rejected: balance changed concurrently",
                amount
            ))
        })
    }
}
