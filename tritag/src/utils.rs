pub(crate) mod tests {
    use crate::model::Model;
    use crate::sentence::Sentence;
    use crate::trainer::Trainer;

    pub(crate) fn train_model(lines: &[&str]) -> Model {
        let mut trainer = Trainer::new();
        for line in lines {
            trainer
                .push_sentence(&Sentence::from_tagged(line).unwrap())
                .unwrap();
        }
        trainer.train()
    }

    /// Two tags; "dog" is always a NOUN, "runs" and "sleeps" are always VERBs.
    pub(crate) fn toy_model() -> Model {
        train_model(&["dog/NOUN runs/VERB", "dog/NOUN sleeps/VERB"])
    }
}
