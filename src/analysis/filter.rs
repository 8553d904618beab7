/// A single stage of the tokenizer pipeline, applied to the surviving token
/// stream after regex extraction and case folding.
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<String>) -> Vec<String>;

    fn name(&self) -> &str;
}
