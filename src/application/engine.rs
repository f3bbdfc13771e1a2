use crate::domain::error::LedgerError;
use crate::domain::ids::{AccountId, Amount, AssetId};
use crate::domain::ledger::{Changeset, Ledger, LedgerSnapshot};
use crate::domain::operation::{Operation, Outcome};
use crate::domain::payment::{PaymentId, PaymentRecord, TimestampSource};
use crate::domain::ports::{LedgerStore, LedgerStoreBox};
use crate::error::{Error, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Bound on queued commands before callers start waiting.
const COMMAND_BUFFER: usize = 1024;

enum Command {
    Execute {
        operation: Operation,
        reply: oneshot::Sender<Result<Outcome>>,
    },
    BalanceOf {
        account: AccountId,
        asset: AssetId,
        reply: oneshot::Sender<Amount>,
    },
    IsEligible {
        asset: AssetId,
        reply: oneshot::Sender<bool>,
    },
    Administrator {
        reply: oneshot::Sender<AccountId>,
    },
    Payment {
        id: PaymentId,
        reply: oneshot::Sender<std::result::Result<PaymentRecord, LedgerError>>,
    },
    Snapshot {
        reply: oneshot::Sender<LedgerSnapshot>,
    },
}

/// The main entry point for running ledger operations.
///
/// `LedgerEngine` is a handle to a single worker task that exclusively owns
/// the `Ledger` and its store. Commands from any number of callers are
/// queued on one channel and handled strictly one at a time, so a transfer's
/// debit, credit and log entry are never observed half-applied.
///
/// Each mutation is planned against the in-memory state, committed to the
/// store, and only then applied in memory. A failed commit leaves both sides
/// as they were.
pub struct LedgerEngine {
    sender: mpsc::Sender<Command>,
    worker: JoinHandle<()>,
}

impl LedgerEngine {
    /// Opens the ledger held by `store`.
    ///
    /// An empty store is initialized with `administrator`; a store that already
    /// holds a ledger keeps its own administrator and `administrator` is ignored.
    pub async fn open<C>(
        store: LedgerStoreBox,
        administrator: AccountId,
        clock: C,
    ) -> Result<Self>
    where
        C: TimestampSource + 'static,
    {
        let ledger = match store.load().await? {
            Some(snapshot) => Ledger::from_snapshot(snapshot),
            None => {
                let genesis = Changeset {
                    administrator: Some(administrator.clone()),
                    ..Default::default()
                };
                store.commit(&genesis).await?;
                Ledger::new(administrator)
            }
        };

        let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
        let worker = tokio::spawn(run(ledger, store, Box::new(clock), receiver));

        Ok(Self { sender, worker })
    }

    pub async fn execute(&self, operation: Operation) -> Result<Outcome> {
        self.request(|reply| Command::Execute { operation, reply })
            .await?
    }

    pub async fn add_eligible_asset(&self, caller: AccountId, asset: AssetId) -> Result<()> {
        self.execute(Operation::AddEligibleAsset { caller, asset })
            .await
            .map(|_| ())
    }

    pub async fn remove_eligible_asset(&self, caller: AccountId, asset: AssetId) -> Result<()> {
        self.execute(Operation::RemoveEligibleAsset { caller, asset })
            .await
            .map(|_| ())
    }

    pub async fn transfer_administrator(
        &self,
        caller: AccountId,
        new_admin: AccountId,
    ) -> Result<()> {
        self.execute(Operation::TransferAdministrator { caller, new_admin })
            .await
            .map(|_| ())
    }

    pub async fn deposit(&self, account: AccountId, amount: Amount, asset: AssetId) -> Result<()> {
        self.execute(Operation::Deposit {
            account,
            amount,
            asset,
        })
        .await
        .map(|_| ())
    }

    pub async fn transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: Amount,
        asset: AssetId,
    ) -> Result<PaymentId> {
        let outcome = self
            .execute(Operation::Transfer {
                sender,
                recipient,
                amount,
                asset,
            })
            .await?;
        outcome.payment_id().ok_or_else(|| {
            Error::Internal(Box::new(std::io::Error::other(
                "transfer completed without a payment record",
            )))
        })
    }

    pub async fn balance_of(&self, account: AccountId, asset: AssetId) -> Result<Amount> {
        self.request(|reply| Command::BalanceOf {
            account,
            asset,
            reply,
        })
        .await
    }

    pub async fn is_eligible(&self, asset: AssetId) -> Result<bool> {
        self.request(|reply| Command::IsEligible { asset, reply })
            .await
    }

    pub async fn administrator(&self) -> Result<AccountId> {
        self.request(|reply| Command::Administrator { reply }).await
    }

    pub async fn payment(&self, id: PaymentId) -> Result<PaymentRecord> {
        Ok(self
            .request(|reply| Command::Payment { id, reply })
            .await??)
    }

    pub async fn snapshot(&self) -> Result<LedgerSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Stops the worker once queued commands are done and returns the final
    /// state.
    pub async fn shutdown(self) -> Result<LedgerSnapshot> {
        let snapshot = self.snapshot().await?;
        drop(self.sender);
        self.worker
            .await
            .map_err(|e| Error::Internal(Box::new(e)))?;
        Ok(snapshot)
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(command(reply))
            .await
            .map_err(|_| Error::ServiceStopped)?;
        response.await.map_err(|_| Error::ServiceStopped)
    }
}

async fn run(
    mut ledger: Ledger,
    store: LedgerStoreBox,
    clock: Box<dyn TimestampSource>,
    mut receiver: mpsc::Receiver<Command>,
) {
    while let Some(command) = receiver.recv().await {
        // A dropped reply only means the caller stopped waiting.
        match command {
            Command::Execute { operation, reply } => {
                let result = execute(&mut ledger, store.as_ref(), clock.as_ref(), operation).await;
                let _ = reply.send(result);
            }
            Command::BalanceOf {
                account,
                asset,
                reply,
            } => {
                let _ = reply.send(ledger.balance_of(&account, &asset));
            }
            Command::IsEligible { asset, reply } => {
                let _ = reply.send(ledger.registry().is_eligible(&asset));
            }
            Command::Administrator { reply } => {
                let _ = reply.send(ledger.registry().administrator().clone());
            }
            Command::Payment { id, reply } => {
                let _ = reply.send(ledger.payment(id));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(ledger.snapshot());
            }
        }
    }
}

async fn execute(
    ledger: &mut Ledger,
    store: &dyn LedgerStore,
    clock: &dyn TimestampSource,
    operation: Operation,
) -> Result<Outcome> {
    let changes = ledger.plan(operation, clock)?;
    store.commit(&changes).await?;
    Ok(ledger.apply(changes))
}
