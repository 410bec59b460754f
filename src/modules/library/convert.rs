//! Pure mappings between entities and transfer objects.

use super::models::{
    Author, AuthorModel, Book, BookModel, BookWrite, EntityState, Publisher, PublisherModel,
    UNASSIGNED_ID,
};

fn external_id(id: i64) -> Option<i64> {
    (id != UNASSIGNED_ID).then_some(id)
}

impl From<&Author> for AuthorModel {
    fn from(author: &Author) -> Self {
        Self {
            id: external_id(author.id),
            name: author.name.clone(),
        }
    }
}

impl From<&Publisher> for PublisherModel {
    fn from(publisher: &Publisher) -> Self {
        Self {
            id: external_id(publisher.id),
            name: publisher.name.clone(),
        }
    }
}

impl From<&Book> for BookModel {
    fn from(book: &Book) -> Self {
        Self {
            id: external_id(book.id),
            title: book.title.clone(),
            isbn: book.isbn.clone(),
            author: AuthorModel::from(&book.author),
            publisher: PublisherModel::from(&book.publisher),
        }
    }
}

impl AuthorModel {
    pub fn to_entity(&self) -> (Author, EntityState) {
        let author = Author {
            id: self.id.unwrap_or(UNASSIGNED_ID),
            name: self.name.clone(),
        };
        (author, EntityState::from_id(self.id))
    }
}

impl PublisherModel {
    pub fn to_entity(&self) -> (Publisher, EntityState) {
        let publisher = Publisher {
            id: self.id.unwrap_or(UNASSIGNED_ID),
            name: self.name.clone(),
        };
        (publisher, EntityState::from_id(self.id))
    }
}

impl BookModel {
    /// Build the write for this book; each entity is `Added` when it has no id, else `Modified`.
    pub fn to_entity(&self) -> BookWrite {
        let (author, author_state) = self.author.to_entity();
        let (publisher, publisher_state) = self.publisher.to_entity();

        BookWrite {
            book: Book {
                id: self.id.unwrap_or(UNASSIGNED_ID),
                isbn: self.isbn.clone(),
                title: self.title.clone(),
                author,
                publisher,
            },
            state: EntityState::from_id(self.id),
            author_state,
            publisher_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(id: Option<i64>, author_id: Option<i64>, publisher_id: Option<i64>) -> BookModel {
        BookModel {
            id,
            title: "Square".into(),
            isbn: "33333".into(),
            author: AuthorModel {
                id: author_id,
                name: "Elle Fergusson".into(),
            },
            publisher: PublisherModel {
                id: publisher_id,
                name: "Wescox".into(),
            },
        }
    }

    #[test]
    fn new_book_is_added_with_unassigned_id() {
        let write = model(None, None, None).to_entity();

        assert_eq!(write.book.id, UNASSIGNED_ID);
        assert_eq!(write.state, EntityState::Added);
        assert_eq!(write.author_state, EntityState::Added);
        assert_eq!(write.publisher_state, EntityState::Added);
    }

    #[test]
    fn states_are_inferred_per_entity() {
        let write = model(Some(3), Some(3), None).to_entity();

        assert_eq!(write.book.id, 3);
        assert_eq!(write.state, EntityState::Modified);
        assert_eq!(write.book.author.id, 3);
        assert_eq!(write.author_state, EntityState::Modified);
        assert_eq!(write.publisher_state, EntityState::Added);
    }

    #[test]
    fn entity_to_model_copies_nested_entities() {
        let book = Book {
            id: 1,
            isbn: "11111".into(),
            title: "New Zealand".into(),
            author: Author {
                id: 1,
                name: "Amy Brown".into(),
            },
            publisher: Publisher {
                id: 1,
                name: "O' Reilly".into(),
            },
        };

        let model = BookModel::from(&book);

        assert_eq!(model.id, Some(1));
        assert_eq!(model.author.name, "Amy Brown");
        assert_eq!(model.publisher.id, Some(1));
        assert_eq!(model.publisher.name, "O' Reilly");
    }

    #[test]
    fn round_trip_preserves_fields() {
        for dto in [
            model(None, None, None),
            model(Some(5), Some(3), Some(4)),
            model(None, Some(1), None),
        ] {
            let back = BookModel::from(&dto.to_entity().book);
            assert_eq!(back, dto);
        }
    }
}
