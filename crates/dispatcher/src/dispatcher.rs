//! RecordDispatcher - the contract shared by every dispatch strategy

use contracts::Record;

use crate::error::DispatchError;

/// Hands one record to one or more output channels
///
/// `dispatch` may wait for channel capacity. It returns once the record is
/// enqueued everywhere it belongs, or fails with the first enqueue error.
#[trait_variant::make(RecordDispatcher: Send)]
pub trait LocalRecordDispatcher<T> {
    async fn dispatch(&self, record: Record<T>) -> Result<(), DispatchError>;
}

/// Dispatch every payload in order, then broadcast the poison record
///
/// Returns the number of data records handed to the dispatcher.
pub async fn dispatch_all<T, D, I>(dispatcher: &D, records: I) -> Result<u64, DispatchError>
where
    D: RecordDispatcher<T> + Sync,
    I: IntoIterator<Item = T>,
{
    let mut count = 0;
    for payload in records {
        dispatcher.dispatch(Record::Data(payload)).await?;
        count += 1;
    }
    dispatcher.dispatch(Record::Poison).await?;
    Ok(count)
}
