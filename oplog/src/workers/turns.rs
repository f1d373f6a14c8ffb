//! Per-table ordering of records processed by concurrent workers.
//!
//! The producer hands every record a ticket from a per-table counter. A worker may only process
//! a record once its table's turn counter reaches the record's ticket, and passes the turn on
//! when it is done. Since the queue is drained in submission order, every earlier ticket of the
//! same table is already held by a running worker, so waiting always makes progress.
//!
//! Tables of one database additionally wait on [`SchemaGates`] until the worker that claimed the
//! database's `CREATE SCHEMA` has forwarded it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};

/// Issues per-table tickets in submission order.
#[derive(Debug, Default)]
pub struct TableTickets {
    next: HashMap<String, u64>,
}

impl TableTickets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next ticket of `table`.
    pub fn issue(&mut self, table: &str) -> u64 {
        let next = self.next.entry(table.to_owned()).or_default();
        let ticket = *next;
        *next += 1;
        ticket
    }
}

/// Tracks, for each table, which ticket is allowed to proceed.
#[derive(Debug, Clone, Default)]
pub struct TableTurns {
    turns: Arc<Mutex<HashMap<String, Arc<watch::Sender<u64>>>>>,
}

impl TableTurns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until `ticket` is the current turn of `table`.
    ///
    /// The returned [`TableTurn`] passes the turn on to the next ticket when dropped.
    pub async fn acquire(&self, table: &str, ticket: u64) -> TableTurn {
        let sender = {
            let mut turns = self.turns.lock().await;
            turns
                .entry(table.to_owned())
                .or_insert_with(|| Arc::new(watch::channel(0).0))
                .clone()
        };

        let mut receiver = sender.subscribe();
        // The sender is held right here, so the channel cannot close while waiting.
        let _ = receiver.wait_for(|current| *current == ticket).await;

        TableTurn { sender }
    }
}

/// The turn of a table, held while a record is processed.
#[derive(Debug)]
pub struct TableTurn {
    sender: Arc<watch::Sender<u64>>,
}

impl Drop for TableTurn {
    fn drop(&mut self) {
        self.sender.send_modify(|current| *current += 1);
    }
}

/// Tracks, for each database, whether its `CREATE SCHEMA` statement reached the writer.
#[derive(Debug, Clone, Default)]
pub struct SchemaGates {
    gates: Arc<Mutex<HashMap<String, Arc<watch::Sender<bool>>>>>,
}

impl SchemaGates {
    pub fn new() -> Self {
        Self::default()
    }

    async fn gate(&self, database: &str) -> Arc<watch::Sender<bool>> {
        let mut gates = self.gates.lock().await;
        gates
            .entry(database.to_owned())
            .or_insert_with(|| Arc::new(watch::channel(false).0))
            .clone()
    }

    /// Marks the `CREATE SCHEMA` of `database` as forwarded, releasing every waiter.
    pub async fn open(&self, database: &str) {
        self.gate(database).await.send_replace(true);
    }

    /// Waits until the `CREATE SCHEMA` of `database` has been forwarded.
    pub async fn wait_open(&self, database: &str) {
        let sender = self.gate(database).await;
        let mut receiver = sender.subscribe();
        let _ = receiver.wait_for(|open| *open).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn tickets_are_counted_per_table() {
        let mut tickets = TableTickets::new();

        assert_eq!(tickets.issue("student"), 0);
        assert_eq!(tickets.issue("student"), 1);
        assert_eq!(tickets.issue("course"), 0);
        assert_eq!(tickets.issue("student"), 2);
    }

    #[tokio::test]
    async fn later_tickets_wait_for_earlier_ones() {
        let turns = TableTurns::new();

        let second = tokio::spawn({
            let turns = turns.clone();
            async move {
                let _turn = turns.acquire("student", 1).await;
            }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!second.is_finished());

        // Other tables are independent.
        drop(turns.acquire("course", 0).await);

        drop(turns.acquire("student", 0).await);
        tokio::time::timeout(Duration::from_secs(1), second)
            .await
            .unwrap()
            .unwrap();

        drop(turns.acquire("student", 2).await);
    }

    #[tokio::test]
    async fn schema_gate_holds_waiters_until_opened() {
        let gates = SchemaGates::new();

        let waiter = tokio::spawn({
            let gates = gates.clone();
            async move { gates.wait_open("shop").await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        // Other databases are independent.
        gates.open("school").await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        gates.open("shop").await;
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();

        // Waiting on an open gate returns immediately.
        gates.wait_open("shop").await;
    }
}
