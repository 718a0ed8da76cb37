//! Animal fact table

/// Animal → fact, in display order
pub const ANIMAL_FACTS: [(&str, &str); 5] = [
    (
        "koala",
        "Koala fingerprints are so close to humans' that they could taint crime scenes.",
    ),
    ("parrot", "Parrots will selflessly help each other out."),
    ("mantis shrimp", "The mantis shrimp has the world's fastest punch."),
    ("lion", "Female lions do 90 percent of the hunting."),
    ("narwhal", "Narwhal tusks are really an \"inside out\" tooth."),
];

/// Every animal with a fact, in display order
pub fn animals() -> impl Iterator<Item = &'static str> {
    ANIMAL_FACTS.iter().map(|(animal, _)| *animal)
}

/// Fact for `animal`, `None` when the animal is unknown
pub fn fact_for(animal: &str) -> Option<&'static str> {
    ANIMAL_FACTS
        .iter()
        .find(|(name, _)| *name == animal)
        .map(|(_, fact)| *fact)
}
