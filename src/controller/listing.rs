//! Index-based listing of participants and sessions.
//!
//! Both registries are arrays behind a count getter, so a listing is one
//! count read followed by per-index reads. Those run through a bounded
//! `buffered` stream: at most `max_concurrent` requests are in flight and
//! results come back in index order.

use alloy::primitives::Address;
use futures_util::stream::{self, StreamExt, TryStreamExt};

use crate::blockchain::{ChainError, ChainResult, ContractGateway, Participant};
use crate::observability::metrics;
use crate::state::Product;

/// Who is looking at a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub account: Address,
    pub is_admin: bool,
}

impl Viewer {
    /// Admins see everyone; members see only themselves.
    pub fn sees_participant(&self, participant: Address) -> bool {
        self.is_admin || participant == self.account
    }
}

/// Registered participants visible to `viewer`, in registration order.
pub async fn fetch_participants<G: ContractGateway>(
    gateway: &G,
    viewer: Viewer,
    max_concurrent: usize,
) -> ChainResult<Vec<Participant>> {
    let width = max_concurrent.max(1);
    let count = gateway.participant_count().await?;

    let addresses: Vec<Address> = stream::iter(0..count)
        .map(|index| gateway.participant_at(index))
        .buffered(width)
        .try_collect()
        .await?;

    let participants: Vec<Participant> = stream::iter(
        addresses
            .into_iter()
            .filter(|address| viewer.sees_participant(*address)),
    )
    .map(|address| gateway.participant(address))
    .buffered(width)
    .try_collect()
    .await?;

    tracing::debug!(
        total = count,
        visible = participants.len(),
        viewer = %viewer.account,
        "Listed participants"
    );
    metrics::record_listing("participants", participants.len());
    Ok(participants)
}

/// Sessions visible to `viewer`, in deployment order, with their details.
///
/// Non-admins only see sessions that are pricing or closed. Details are
/// read for visible sessions only. A session reporting a status code
/// outside the known set is skipped.
pub async fn fetch_products<G: ContractGateway>(
    gateway: &G,
    viewer: Viewer,
    max_concurrent: usize,
) -> ChainResult<Vec<Product>> {
    let width = max_concurrent.max(1);
    let count = gateway.session_count().await?;

    let sessions: Vec<Address> = stream::iter(0..count)
        .map(|index| gateway.session_at(index))
        .buffered(width)
        .try_collect()
        .await?;

    let statuses: Vec<_> = stream::iter(sessions)
        .map(|session| async move { (session, gateway.session_status(session).await) })
        .buffered(width)
        .collect()
        .await;

    let mut visible = Vec::with_capacity(statuses.len());
    for (session, status) in statuses {
        match status {
            Ok(status) if viewer.is_admin || status.is_public() => visible.push((session, status)),
            Ok(_) => {}
            Err(ChainError::UnknownStatus(code)) => {
                tracing::warn!(%session, code, "Skipping session with unknown status");
            }
            Err(e) => return Err(e),
        }
    }

    let products: Vec<Product> = stream::iter(visible)
        .map(|(address, status)| async move {
            let (meta, figures) = tokio::try_join!(
                gateway.session_meta(address),
                gateway.session_figures(address, viewer.account),
            )?;
            Ok::<_, ChainError>(Product {
                address,
                meta,
                status,
                figures,
            })
        })
        .buffered(width)
        .try_collect()
        .await?;

    tracing::debug!(
        total = count,
        visible = products.len(),
        viewer = %viewer.account,
        "Listed products"
    );
    metrics::record_listing("products", products.len());
    Ok(products)
}
