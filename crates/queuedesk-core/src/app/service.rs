//! ServicePointService - ストア・キューイングエンジン・ストリームの組み立て
//!
//! # dequeue の部分失敗ポリシー
//! 1. retire（queue engine）: 失敗は致命的。ルックアップも publish もしない
//! 2. office number ルックアップ（store）: 失敗は致命的。retire 済みチケットは巻き戻さない
//! 3. publish（stream）: 失敗は非致命的。EventSink に記録し、チケットは成功として返す
//!
//! 1–2 は成功の前提条件、3 はベストエフォート。返り値は常に 1 で得たチケットだけ。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::builder::ServiceBuilder;
use super::context::CallContext;
use crate::domain::{
    DomainEvent, ServiceError, ServicePointId, ServicePointRecord, ServicePointRequest, Ticket,
    TicketCompletionEvent,
};
use crate::ports::{Clock, EventPublisher, EventSink, QueueGateway, RecordStore};

pub struct ServicePointService {
    store: Arc<dyn RecordStore>,
    gateway: Arc<dyn QueueGateway>,
    publisher: Arc<dyn EventPublisher>,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    request_timeout: Option<Duration>,
}

impl ServicePointService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        gateway: Arc<dyn QueueGateway>,
        publisher: Arc<dyn EventPublisher>,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            gateway,
            publisher,
            sink,
            clock,
            request_timeout: None,
        }
    }

    /// Default deadline for contexts created by [`Self::context`].
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// A fresh context carrying the configured request timeout.
    pub fn context(&self) -> CallContext {
        CallContext::from_timeout(self.request_timeout)
    }

    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    /// Create a record with a store-assigned id.
    pub async fn create(
        &self,
        ctx: &CallContext,
        request: &ServicePointRequest,
    ) -> Result<ServicePointRecord, ServiceError> {
        request.validate()?;
        let record = ctx.bound("store.create", self.store.create(request)).await?;
        debug!(request_id = %ctx.request_id(), id = %record.id, "service point created");
        Ok(record)
    }

    /// Replace every mutable field of an existing record.
    pub async fn update(
        &self,
        ctx: &CallContext,
        id: &str,
        request: &ServicePointRequest,
    ) -> Result<ServicePointRecord, ServiceError> {
        request.validate()?;
        let id = parse_id(id)?;
        ctx.bound("store.update", self.store.update(&id.routing_key(), request))
            .await
    }

    /// Create or fully overwrite the record under `id`.
    pub async fn upsert(
        &self,
        ctx: &CallContext,
        id: &str,
        request: &ServicePointRequest,
    ) -> Result<ServicePointRecord, ServiceError> {
        request.validate()?;
        let id = parse_id(id)?;
        ctx.bound("store.upsert", self.store.upsert(&id.routing_key(), request))
            .await
    }

    pub async fn delete(
        &self,
        ctx: &CallContext,
        id: &str,
    ) -> Result<ServicePointRecord, ServiceError> {
        let id = parse_id(id)?;
        ctx.bound("store.delete", self.store.delete(&id.routing_key()))
            .await
    }

    pub async fn get(
        &self,
        ctx: &CallContext,
        id: &str,
    ) -> Result<ServicePointRecord, ServiceError> {
        let id = parse_id(id)?;
        ctx.bound("store.get_by_id", self.store.get_by_id(&id.routing_key()))
            .await
    }

    /// Look up the short code, then ask the queueing engine for a ticket.
    ///
    /// An unknown service point never reaches the engine.
    pub async fn enqueue(&self, ctx: &CallContext, id: &str) -> Result<Ticket, ServiceError> {
        let id = parse_id(id)?;
        let key = id.routing_key();

        let short_code = ctx
            .bound(
                "store.get_short_name_by_id",
                self.store.get_short_name_by_id(&key),
            )
            .await?;
        let ticket = ctx
            .bound("queue.issue", self.gateway.issue(&key, &short_code))
            .await?;

        debug!(request_id = %ctx.request_id(), %id, %ticket, "ticket issued");
        self.sink.emit(DomainEvent::TicketIssued {
            id,
            ticket: ticket.clone(),
        });
        Ok(ticket)
    }

    /// Retire the next ticket, resolve the office number, publish the completion.
    pub async fn dequeue(&self, ctx: &CallContext, id: &str) -> Result<Ticket, ServiceError> {
        let id = parse_id(id)?;
        let key = id.routing_key();

        let ticket = ctx.bound("queue.retire", self.gateway.retire(&key)).await?;
        self.sink.emit(DomainEvent::TicketRetired {
            id,
            ticket: ticket.clone(),
        });

        let office_number = match ctx
            .bound(
                "store.get_office_number_by_id",
                self.store.get_office_number_by_id(&key),
            )
            .await
        {
            Ok(office_number) => office_number,
            Err(err) => {
                // the engine already retired the ticket; nothing rolls that back
                warn!(request_id = %ctx.request_id(), %id, %ticket, error = %err, "ticket retired but office lookup failed");
                return Err(err);
            }
        };

        let event = TicketCompletionEvent::new(&ticket, office_number.clone(), self.clock.now());
        match ctx
            .bound("stream.publish", self.publisher.publish(&event))
            .await
        {
            Ok(()) => self.sink.emit(DomainEvent::CompletionPublished {
                id,
                ticket: ticket.clone(),
                office_number,
            }),
            Err(err) => self.sink.emit(DomainEvent::CompletionPublishFailed {
                id,
                ticket: ticket.clone(),
                office_number,
                reason: err.to_string(),
            }),
        }

        debug!(request_id = %ctx.request_id(), %id, %ticket, "ticket dequeued");
        Ok(ticket)
    }
}

fn parse_id(raw: &str) -> Result<ServicePointId, ServiceError> {
    Ok(raw.parse::<ServicePointId>()?)
}
