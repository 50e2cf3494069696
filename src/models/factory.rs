use crate::config::LogisticConfig;
use crate::models::classifier_trait::BinaryClassifier;
use crate::models::logistic::LogisticRegression;

/// Build a boxed classifier from a `LogisticConfig`.
/// A thin factory so the validation code depends only on the trait.
pub fn build_model(config: LogisticConfig) -> Box<dyn BinaryClassifier> {
    Box::new(LogisticRegression::new(config))
}
