use libris_kernel::Migration;

pub fn migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_init",
        up: r#"
            CREATE TABLE IF NOT EXISTS authors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS publishers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                isbn TEXT NOT NULL,
                title TEXT NOT NULL,
                author_id INTEGER NOT NULL REFERENCES authors(id),
                publisher_id INTEGER NOT NULL REFERENCES publishers(id)
            );

            CREATE INDEX IF NOT EXISTS books_author_id ON books(author_id);
            CREATE INDEX IF NOT EXISTS books_publisher_id ON books(publisher_id);
            CREATE INDEX IF NOT EXISTS authors_name ON authors(name);
        "#,
    }]
}

/// Sample catalogue; `INSERT OR IGNORE` keeps it safe to re-run against existing rows.
pub fn seeds() -> Vec<Migration> {
    vec![Migration {
        id: "001_sample_catalogue",
        up: r#"
            INSERT OR IGNORE INTO authors (id, name) VALUES
                (1, 'Amy Brown'),
                (2, 'Cathy Dunne'),
                (3, 'Elle Fergusson');

            INSERT OR IGNORE INTO publishers (id, name) VALUES
                (1, 'O'' Reilly'),
                (2, 'Microsoft Press'),
                (3, 'Wescox'),
                (4, 'Apress');

            INSERT OR IGNORE INTO books (id, isbn, title, author_id, publisher_id) VALUES
                (1, '11111', 'New Zealand', 1, 1),
                (2, '22222', 'Red', 2, 2),
                (3, '33333', 'Square', 3, 3),
                (4, '44444', 'Blue', 2, 2),
                (5, '55555', 'Circle', 3, 4);
        "#,
    }]
}
