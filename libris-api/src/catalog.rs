use std::collections::HashMap;

/// Read-only mirror of the public book catalog. These shapes are the
/// catalog's contract, not ours: `id` is the catalog's numeric id and
/// `formats` maps MIME types to download urls.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub authors: Vec<Author>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub formats: HashMap<String, String>,
    #[serde(default)]
    pub download_count: u64,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Author {
    pub name: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
}

/// One page of catalog results; `next` is null on the last page.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct BookPage {
    pub results: Vec<Book>,
    pub next: Option<String>,
}

impl Book {
    pub fn cover(&self) -> Option<&str> {
        self.formats.get("image/jpeg").map(|u| u as &str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_page() {
        let page: BookPage = serde_json::from_str(
            r#"{
                "count": 2,
                "next": "https://catalog.example/books/?page=2",
                "results": [{
                    "id": 2600,
                    "title": "War and Peace",
                    "authors": [{"name": "Tolstoy, Leo", "birth_year": 1828, "death_year": 1910}],
                    "subjects": ["Historical fiction"],
                    "languages": ["en"],
                    "formats": {"image/jpeg": "https://catalog.example/2600/cover.jpg"},
                    "download_count": 12345
                }]
            }"#,
        )
        .expect("parsing catalog page");
        assert!(page.next.is_some());
        assert_eq!(page.results.len(), 1);
        assert_eq!(
            page.results[0].cover(),
            Some("https://catalog.example/2600/cover.jpg"),
        );
    }

    #[test]
    fn missing_optional_fields_default() {
        let book: Book = serde_json::from_str(
            r#"{"id": 1, "title": "Bare", "authors": []}"#,
        )
        .expect("parsing bare book");
        assert_eq!(book.cover(), None);
        assert_eq!(book.download_count, 0);
    }
}
