pub struct SeedAuthor {
    pub name: &'static str,
}

pub struct SeedBook {
    pub title: &'static str,
    pub author: &'static str,
}

pub static SEED_AUTHORS: &[SeedAuthor] = &[
    SeedAuthor {
        name: "Robert Kyosaki",
    },
    SeedAuthor {
        name: "Paul Auster",
    },
];

pub static SEED_BOOKS: &[SeedBook] = &[
    SeedBook {
        title: "The Awkening",
        author: "Kate Chopin",
    },
    SeedBook {
        title: "City of Glass",
        author: "Paul Auster",
    },
];
