//! Transaction description categorizer.
//!
//! A multinomial naive Bayes classifier over unigrams and bigrams,
//! trained at startup on a small embedded corpus of Indian merchant
//! phrasings. Good enough to pre-fill a category the user can correct;
//! the label set doubles as the default categories every account is
//! seeded with.

use std::collections::HashMap;

/// Every label the classifier can emit, and the default category set.
pub const LABELS: &[&str] = &[
    "Food & Dining",
    "Shopping",
    "Transportation",
    "Bills & Utilities",
    "Entertainment",
    "Healthcare",
    "Education",
    "Travel",
    "Groceries",
    "ATM/Cash",
    "Income",
    "Others",
];

const TRAINING_DATA: &[(&str, &str)] = &[
    ("swiggy payment", "Food & Dining"),
    ("zomato order", "Food & Dining"),
    ("restaurant bill", "Food & Dining"),
    ("dominos pizza", "Food & Dining"),
    ("pizza", "Food & Dining"),
    ("cafe coffee", "Food & Dining"),
    ("mcdonalds", "Food & Dining"),
    ("burger king", "Food & Dining"),
    ("kfc", "Food & Dining"),
    ("amazon purchase", "Shopping"),
    ("amazon shopping", "Shopping"),
    ("flipkart order", "Shopping"),
    ("myntra fashion", "Shopping"),
    ("online shopping", "Shopping"),
    ("uber ride", "Transportation"),
    ("ola cab", "Transportation"),
    ("petrol pump", "Transportation"),
    ("metro card recharge", "Transportation"),
    ("railway", "Transportation"),
    ("electricity bill", "Bills & Utilities"),
    ("mobile recharge", "Bills & Utilities"),
    ("internet bill", "Bills & Utilities"),
    ("water bill", "Bills & Utilities"),
    ("gas bill", "Bills & Utilities"),
    ("airtel", "Bills & Utilities"),
    ("vodafone", "Bills & Utilities"),
    ("jio", "Bills & Utilities"),
    ("netflix subscription", "Entertainment"),
    ("netflix", "Entertainment"),
    ("movie ticket", "Entertainment"),
    ("spotify premium", "Entertainment"),
    ("spotify", "Entertainment"),
    ("amazon prime", "Entertainment"),
    ("hotstar", "Entertainment"),
    ("pvr cinema", "Entertainment"),
    ("apollo pharmacy", "Healthcare"),
    ("doctor consultation", "Healthcare"),
    ("medical store", "Healthcare"),
    ("hospital", "Healthcare"),
    ("medicine", "Healthcare"),
    ("clinic", "Healthcare"),
    ("atm withdrawal", "ATM/Cash"),
    ("cash withdrawal", "ATM/Cash"),
    ("atm", "ATM/Cash"),
    ("withdrawn from atm", "ATM/Cash"),
    ("hdfc bank atm", "ATM/Cash"),
    ("sbi atm", "ATM/Cash"),
    ("salary", "Income"),
    ("salary credit", "Income"),
    ("salary from", "Income"),
    ("tech private limited", "Income"),
    ("credited salary", "Income"),
    ("monthly salary", "Income"),
    ("bigbasket order", "Groceries"),
    ("dmart purchase", "Groceries"),
    ("vegetable market", "Groceries"),
    ("grocery", "Groceries"),
    ("supermarket", "Groceries"),
];

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "in", "is", "it",
    "of", "on", "or", "that", "the", "to", "was", "will", "with", "your", "you",
];

struct Class {
    label: &'static str,
    log_prior: f64,
    token_counts: HashMap<String, u32>,
    total_tokens: u32,
}

pub struct Categorizer {
    classes: Vec<Class>,
    vocabulary: usize,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Categorizer {
    /// Train on the embedded corpus. Cheap enough to do at startup.
    pub fn new() -> Self {
        let mut classes: Vec<Class> = Vec::new();
        let mut vocabulary: HashMap<String, ()> = HashMap::new();

        for (description, label) in TRAINING_DATA {
            let class = match classes.iter_mut().find(|c| c.label == *label) {
                Some(class) => class,
                None => {
                    classes.push(Class {
                        label,
                        log_prior: 0.0,
                        token_counts: HashMap::new(),
                        total_tokens: 0,
                    });
                    classes.last_mut().unwrap_or_else(|| unreachable!())
                }
            };
            for token in tokenize(description) {
                vocabulary.insert(token.clone(), ());
                *class.token_counts.entry(token).or_insert(0) += 1;
                class.total_tokens += 1;
            }
        }

        let total = TRAINING_DATA.len() as f64;
        for class in &mut classes {
            let examples = TRAINING_DATA
                .iter()
                .filter(|(_, label)| *label == class.label)
                .count() as f64;
            class.log_prior = (examples / total).ln();
        }

        Categorizer {
            classes,
            vocabulary: vocabulary.len(),
        }
    }

    pub fn labels(&self) -> &'static [&'static str] {
        LABELS
    }

    /// Most likely category for a description, with the normalized
    /// posterior probability as confidence.
    pub fn predict(&self, description: &str) -> (&'static str, f64) {
        let description = if description.trim().is_empty() {
            "Unknown Transaction"
        } else {
            description
        };
        let tokens = tokenize(description);

        let scores: Vec<f64> = self
            .classes
            .iter()
            .map(|class| {
                let mut score = class.log_prior;
                for token in &tokens {
                    let count = *class.token_counts.get(token).unwrap_or(&0);
                    // Laplace smoothing keeps unseen tokens from zeroing
                    // the class out.
                    score += ((count as f64 + 1.0)
                        / (class.total_tokens as f64 + self.vocabulary as f64))
                        .ln();
                }
                score
            })
            .collect();

        let best = scores
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .unwrap_or(0);

        // Softmax over the log scores for a usable confidence number.
        let max = scores[best];
        let denom: f64 = scores.iter().map(|s| (s - max).exp()).sum();
        let confidence = 1.0 / denom;

        (self.classes[best].label, confidence)
    }
}

/// Lowercased unigrams (stopwords and single characters dropped) plus
/// adjacent-pair bigrams.
fn tokenize(text: &str) -> Vec<String> {
    let words: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 2 && !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect();
    let mut tokens = words.clone();
    for pair in words.windows(2) {
        tokens.push(format!("{} {}", pair[0], pair[1]));
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_trained_merchants() {
        let model = Categorizer::new();
        assert_eq!(model.predict("Swiggy order 4821").0, "Food & Dining");
        assert_eq!(model.predict("UBER RIDE BLR").0, "Transportation");
        assert_eq!(model.predict("netflix subscription renewal").0, "Entertainment");
        assert_eq!(model.predict("salary credited by employer").0, "Income");
        assert_eq!(model.predict("ATM withdrawal MG Road").0, "ATM/Cash");
    }

    #[test]
    fn confidence_is_a_probability() {
        let model = Categorizer::new();
        let (_, confidence) = model.predict("dominos pizza order");
        assert!(confidence > 0.0 && confidence <= 1.0);
    }

    #[test]
    fn empty_descriptions_still_get_a_label() {
        let model = Categorizer::new();
        let (label, _) = model.predict("   ");
        assert!(LABELS.contains(&label));
    }

    #[test]
    fn label_set_is_stable() {
        let model = Categorizer::new();
        assert_eq!(model.labels().len(), 12);
        assert!(model.labels().contains(&"Others"));
    }
}
