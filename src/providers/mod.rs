pub mod financial_datasets;
pub mod gemini;
pub mod tavily;
