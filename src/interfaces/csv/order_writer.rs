use crate::application::engine::OrderSummary;
use crate::error::Result;
use std::io::Write;

/// Writes order summaries as CSV, one row per order.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header followed by every summary, then flushes.
    pub fn write_orders(&mut self, orders: impl IntoIterator<Item = OrderSummary>) -> Result<()> {
        for order in orders {
            self.writer.serialize(order)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
