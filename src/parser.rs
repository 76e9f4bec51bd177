//! PubMed `efetch` XML parsing.
//!
//! The batch document is walked with a streaming reader. Each
//! `<PubmedArticle>` element is cut out of the document and parsed on its
//! own, so one broken record is logged and skipped instead of failing the
//! whole batch. Only a document that is not well-formed XML, whose root
//! is not `<PubmedArticleSet>`, or that has content after the root closes,
//! is an error.

use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::models::{Article, ArticleBuilder, Author};

const ROOT_ELEMENT: &[u8] = b"PubmedArticleSet";
const ARTICLE_ELEMENT: &[u8] = b"PubmedArticle";

const PMID_PATH: [&str; 2] = ["MedlineCitation", "PMID"];
const TITLE_PATH: [&str; 3] = ["MedlineCitation", "Article", "ArticleTitle"];
const PUB_DATE_PATH: [&str; 5] = [
    "MedlineCitation",
    "Article",
    "Journal",
    "JournalIssue",
    "PubDate",
];

/// The batch document itself could not be read.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed XML document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("expected <PubmedArticleSet> root element, found <{0}>")]
    UnexpectedRoot(String),

    #[error("document has no root element")]
    MissingRoot,

    #[error("unexpected content after </PubmedArticleSet>: {0}")]
    TrailingContent(String),
}

/// A single `<PubmedArticle>` did not have the expected structure.
#[derive(Debug, thiserror::Error)]
pub enum MalformedRecord {
    #[error("missing <MedlineCitation> element")]
    MissingCitation,

    #[error("invalid XML in article: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Parse an `efetch` response into articles, skipping malformed records.
pub fn parse_article_set(xml: &str) -> Result<Vec<Article>, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut articles = Vec::new();
    let mut skipped = 0usize;
    let mut seen_root = false;
    let mut root_closed = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if root_closed => {
                return Err(ParseError::TrailingContent(format!(
                    "<{}>",
                    String::from_utf8_lossy(e.name().as_ref())
                )));
            }
            Event::Text(e) if root_closed && !e.iter().all(u8::is_ascii_whitespace) => {
                return Err(ParseError::TrailingContent(
                    String::from_utf8_lossy(&e).trim().to_string(),
                ));
            }
            Event::CData(_) if root_closed => {
                return Err(ParseError::TrailingContent("CDATA section".to_string()));
            }
            Event::Start(e) if !seen_root => {
                check_root(e.local_name().as_ref())?;
                seen_root = true;
            }
            Event::Empty(e) if !seen_root => {
                // <PubmedArticleSet/>: nothing inside
                check_root(e.local_name().as_ref())?;
                seen_root = true;
                root_closed = true;
            }
            Event::Start(e) => {
                let tag = e.name().as_ref().to_vec();
                let span = reader.read_to_end(QName(&tag))?;
                let fragment = &xml[span.start as usize..span.end as usize];

                if e.local_name().as_ref() != ARTICLE_ELEMENT {
                    debug!(
                        element = %String::from_utf8_lossy(&tag),
                        "Ignoring non-article element"
                    );
                    continue;
                }

                match parse_article(fragment) {
                    Ok(article) => articles.push(article),
                    Err(err) => {
                        skipped += 1;
                        warn!(
                            position = articles.len() + skipped,
                            error = %err,
                            "Skipping malformed PubMed article"
                        );
                    }
                }
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == ARTICLE_ELEMENT {
                    skipped += 1;
                    warn!(
                        position = articles.len() + skipped,
                        error = %MalformedRecord::MissingCitation,
                        "Skipping malformed PubMed article"
                    );
                } else {
                    debug!(
                        element = %String::from_utf8_lossy(e.name().as_ref()),
                        "Ignoring non-article element"
                    );
                }
            }
            // children are consumed whole by read_to_end, so this closes the root
            Event::End(_) => root_closed = true,
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(ParseError::MissingRoot);
    }

    debug!(parsed = articles.len(), skipped, "Parsed PubMed article set");
    Ok(articles)
}

fn check_root(name: &[u8]) -> Result<(), ParseError> {
    if name == ROOT_ELEMENT {
        Ok(())
    } else {
        Err(ParseError::UnexpectedRoot(
            String::from_utf8_lossy(name).into_owned(),
        ))
    }
}

/// Parse the inner content of one `<PubmedArticle>` element.
pub fn parse_article(fragment: &str) -> Result<Article, MalformedRecord> {
    let mut reader = Reader::from_str(fragment);
    let mut path: Vec<String> = Vec::new();
    let mut has_citation = false;

    let mut pmid = String::new();
    let mut title = String::new();
    let mut pub_date = PubDateParts::default();
    let mut authors = Vec::new();
    let mut current: Option<AuthorParts> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match name.as_str() {
                    "MedlineCitation" if path.is_empty() => has_citation = true,
                    "Author" if is_author_list(&path) => current = Some(AuthorParts::default()),
                    _ => {}
                }
                path.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"MedlineCitation" if path.is_empty() => has_citation = true,
                    b"Author" if is_author_list(&path) => authors.push(Author::default()),
                    _ => {}
                }
            }
            Event::End(_) => match path.pop().as_deref() {
                Some("Author") if is_author_list(&path) => {
                    if let Some(parts) = current.take() {
                        authors.push(parts.into_author());
                    }
                }
                Some("Affiliation") => {
                    if let Some(parts) = current.as_mut() {
                        parts.close_affiliation();
                    }
                }
                _ => {}
            },
            Event::Text(e) => {
                let text = e.unescape().map_err(quick_xml::Error::from)?;
                collect_text(&path, &text, &mut pmid, &mut title, &mut pub_date, &mut current);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                collect_text(&path, &text, &mut pmid, &mut title, &mut pub_date, &mut current);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !has_citation {
        return Err(MalformedRecord::MissingCitation);
    }

    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    let builder = ArticleBuilder::new()
        .id(pmid)
        .title(title)
        .publication_date(pub_date.render());

    Ok(authors
        .into_iter()
        .fold(builder, |builder, author| builder.author(author))
        .build())
}

fn collect_text(
    path: &[String],
    text: &str,
    pmid: &mut String,
    title: &mut String,
    pub_date: &mut PubDateParts,
    current: &mut Option<AuthorParts>,
) {
    if path_is(path, &PMID_PATH) {
        pmid.push_str(text);
    } else if starts_with(path, &TITLE_PATH) {
        title.push_str(text);
    } else if starts_with(path, &PUB_DATE_PATH) && path.len() == PUB_DATE_PATH.len() + 1 {
        pub_date.push(&path[PUB_DATE_PATH.len()], text);
    } else if let Some(parts) = current.as_mut() {
        parts.push(path, text);
    }
}

fn is_author_list(path: &[String]) -> bool {
    path.last().map(String::as_str) == Some("AuthorList")
}

fn path_is(path: &[String], expected: &[&str]) -> bool {
    path.len() == expected.len() && starts_with(path, expected)
}

fn starts_with(path: &[String], prefix: &[&str]) -> bool {
    path.len() >= prefix.len() && path.iter().zip(prefix).all(|(p, e)| p == e)
}

/// Pieces of a `<PubDate>` element.
#[derive(Debug, Default)]
struct PubDateParts {
    year: String,
    season: String,
    month: String,
    day: String,
    medline_date: String,
}

impl PubDateParts {
    fn push(&mut self, element: &str, text: &str) {
        let target = match element {
            "Year" => &mut self.year,
            "Season" => &mut self.season,
            "Month" => &mut self.month,
            "Day" => &mut self.day,
            "MedlineDate" => &mut self.medline_date,
            _ => return,
        };
        target.push_str(text);
    }

    /// "Year [Season] Month Day" with missing parts left out, or the
    /// MedlineDate when PubMed gives a free-text date instead.
    fn render(&self) -> String {
        let medline = self.medline_date.trim();
        if !medline.is_empty() {
            return medline.to_string();
        }
        [&self.year, &self.season, &self.month, &self.day]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Text collected for the `<Author>` currently being read.
#[derive(Debug, Default)]
struct AuthorParts {
    last_name: String,
    fore_name: String,
    collective_name: String,
    affiliation: String,
    has_affiliation: bool,
}

impl AuthorParts {
    fn push(&mut self, path: &[String], text: &str) {
        let Some(author_idx) = path.iter().rposition(|p| p == "Author") else {
            return;
        };
        let inner: Vec<&str> = path[author_idx + 1..].iter().map(String::as_str).collect();

        match inner.as_slice() {
            ["LastName"] => self.last_name.push_str(text),
            ["ForeName"] => self.fore_name.push_str(text),
            ["CollectiveName", ..] => self.collective_name.push_str(text),
            ["AffiliationInfo", "Affiliation", ..] if !self.has_affiliation => {
                self.affiliation.push_str(text)
            }
            _ => {}
        }
    }

    /// Keep the first `<Affiliation>` that had any text
    fn close_affiliation(&mut self) {
        if self.affiliation.trim().is_empty() {
            self.affiliation.clear();
        } else {
            self.has_affiliation = true;
        }
    }

    fn into_author(self) -> Author {
        let mut name = format!("{} {}", self.fore_name.trim(), self.last_name.trim())
            .trim()
            .to_string();
        if name.is_empty() {
            name = self.collective_name.trim().to_string();
        }
        Author::new(name, self.affiliation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NOT_AVAILABLE, NO_TITLE};

    const ARTICLE_111: &str = r#"
    <PubmedArticle>
        <MedlineCitation Status="MEDLINE" Owner="NLM">
            <PMID Version="1">111</PMID>
            <Article PubModel="Print">
                <Journal>
                    <JournalIssue CitedMedium="Internet">
                        <PubDate><Year>2023</Year><Month>Jan</Month><Day>05</Day></PubDate>
                    </JournalIssue>
                </Journal>
                <ArticleTitle>CRISPR screens in <i>vivo</i>.</ArticleTitle>
                <AuthorList CompleteYN="Y">
                    <Author ValidYN="Y">
                        <LastName>Smith</LastName>
                        <ForeName>A</ForeName>
                        <AffiliationInfo>
                            <Affiliation>Acme Biotech, a.smith@acme.com</Affiliation>
                        </AffiliationInfo>
                        <AffiliationInfo>
                            <Affiliation>Harvard University</Affiliation>
                        </AffiliationInfo>
                    </Author>
                    <Author ValidYN="Y">
                        <LastName>Jones</LastName>
                        <ForeName>B</ForeName>
                        <AffiliationInfo>
                            <Affiliation>State University</Affiliation>
                        </AffiliationInfo>
                    </Author>
                </AuthorList>
            </Article>
            <CommentsCorrectionsList>
                <CommentsCorrections RefType="ErratumIn">
                    <PMID Version="1">999</PMID>
                </CommentsCorrections>
            </CommentsCorrectionsList>
        </MedlineCitation>
    </PubmedArticle>"#;

    fn article_set(articles: &[&str]) -> String {
        format!(
            "<?xml version=\"1.0\" ?>\n\
             <!DOCTYPE PubmedArticleSet PUBLIC \"-//NLM//DTD PubMedArticle, 1st January 2024//EN\" \
             \"https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd\">\n\
             <PubmedArticleSet>{}</PubmedArticleSet>",
            articles.concat()
        )
    }

    #[test]
    fn test_parse_well_formed_article() {
        let articles = parse_article_set(&article_set(&[ARTICLE_111])).unwrap();
        assert_eq!(articles.len(), 1);

        let article = &articles[0];
        assert_eq!(article.id, "111");
        assert_eq!(article.title, "CRISPR screens in vivo.");
        assert_eq!(article.publication_date, "2023 Jan 05");
        assert_eq!(article.authors.len(), 2);

        let smith = &article.authors[0];
        assert_eq!(smith.name, "A Smith");
        assert_eq!(smith.affiliation, "Acme Biotech, a.smith@acme.com");
        assert_eq!(smith.email, "a.smith@acme.com");

        let jones = &article.authors[1];
        assert_eq!(jones.name, "B Jones");
        assert_eq!(jones.affiliation, "State University");
        assert_eq!(jones.email, "");
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let xml = article_set(&[r#"
            <PubmedArticle>
                <MedlineCitation>
                    <Article>
                        <AuthorList>
                            <Author><LastName>Solo</LastName></Author>
                            <Author><ForeName>Ann</ForeName></Author>
                        </AuthorList>
                    </Article>
                </MedlineCitation>
            </PubmedArticle>"#]);

        let articles = parse_article_set(&xml).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, NOT_AVAILABLE);
        assert_eq!(articles[0].title, NO_TITLE);
        assert_eq!(articles[0].publication_date, NOT_AVAILABLE);
        assert_eq!(articles[0].authors[0].name, "Solo");
        assert_eq!(articles[0].authors[0].affiliation, "");
        assert_eq!(articles[0].authors[1].name, "Ann");
    }

    #[test]
    fn test_medline_date_and_season() {
        let xml = article_set(&[
            r#"<PubmedArticle><MedlineCitation><PMID>1</PMID><Article><Journal><JournalIssue>
                <PubDate><MedlineDate>1998 Dec-1999 Jan</MedlineDate></PubDate>
            </JournalIssue></Journal></Article></MedlineCitation></PubmedArticle>"#,
            r#"<PubmedArticle><MedlineCitation><PMID>2</PMID><Article><Journal><JournalIssue>
                <PubDate><Year>2019</Year><Season>Spring</Season></PubDate>
            </JournalIssue></Journal></Article></MedlineCitation></PubmedArticle>"#,
        ]);

        let articles = parse_article_set(&xml).unwrap();
        assert_eq!(articles[0].publication_date, "1998 Dec-1999 Jan");
        assert_eq!(articles[1].publication_date, "2019 Spring");
    }

    #[test]
    fn test_collective_name_author() {
        let xml = article_set(&[r#"
            <PubmedArticle><MedlineCitation><PMID>7</PMID><Article><AuthorList>
                <Author><CollectiveName>COVID-19 Genomics Consortium</CollectiveName></Author>
            </AuthorList></Article></MedlineCitation></PubmedArticle>"#]);

        let articles = parse_article_set(&xml).unwrap();
        assert_eq!(articles[0].authors[0].name, "COVID-19 Genomics Consortium");
    }

    #[test]
    fn test_escaped_text_is_unescaped() {
        let xml = article_set(&[r#"
            <PubmedArticle><MedlineCitation><PMID>8</PMID><Article>
                <ArticleTitle>Drugs &amp; devices</ArticleTitle>
                <AuthorList><Author><LastName>Lee</LastName><ForeName>C</ForeName>
                    <AffiliationInfo><Affiliation>Smith &amp; Nephew plc</Affiliation></AffiliationInfo>
                </Author></AuthorList>
            </Article></MedlineCitation></PubmedArticle>"#]);

        let articles = parse_article_set(&xml).unwrap();
        assert_eq!(articles[0].title, "Drugs & devices");
        assert_eq!(articles[0].authors[0].affiliation, "Smith & Nephew plc");
    }

    #[test]
    fn test_broken_article_is_skipped() {
        let missing_citation = r#"
            <PubmedArticle>
                <PubmedData><ArticleIdList><ArticleId IdType="pubmed">222</ArticleId></ArticleIdList></PubmedData>
            </PubmedArticle>"#;
        let bad_entity = r#"
            <PubmedArticle><MedlineCitation><PMID>333</PMID><Article>
                <ArticleTitle>Broken &notanentity; title</ArticleTitle>
            </Article></MedlineCitation></PubmedArticle>"#;

        let articles =
            parse_article_set(&article_set(&[ARTICLE_111, missing_citation, bad_entity])).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "111");
    }

    #[test]
    fn test_empty_article_element_is_skipped() {
        let articles =
            parse_article_set(&article_set(&["<PubmedArticle/>", ARTICLE_111])).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "111");

        assert!(parse_article_set("<PubmedArticleSet><PubmedArticle/></PubmedArticleSet>")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_first_non_empty_affiliation_is_used() {
        let xml = article_set(&[r#"
            <PubmedArticle><MedlineCitation><PMID>9</PMID><Article><AuthorList>
                <Author><LastName>Kim</LastName><ForeName>D</ForeName>
                    <AffiliationInfo><Identifier Source="ROR">https://ror.org/00abc</Identifier></AffiliationInfo>
                    <AffiliationInfo><Affiliation>   </Affiliation></AffiliationInfo>
                    <AffiliationInfo><Affiliation>Pfizer Inc, d.kim@pfizer.com</Affiliation></AffiliationInfo>
                    <AffiliationInfo><Affiliation>Yale University</Affiliation></AffiliationInfo>
                </Author>
            </AuthorList></Article></MedlineCitation></PubmedArticle>"#]);

        let articles = parse_article_set(&xml).unwrap();
        let kim = &articles[0].authors[0];
        assert_eq!(kim.affiliation, "Pfizer Inc, d.kim@pfizer.com");
        assert_eq!(kim.email, "d.kim@pfizer.com");
    }

    #[test]
    fn test_parse_article_reports_missing_citation() {
        let result = parse_article("<PubmedData></PubmedData>");
        assert!(matches!(result, Err(MalformedRecord::MissingCitation)));
    }

    #[test]
    fn test_empty_article_set() {
        assert!(parse_article_set("<PubmedArticleSet></PubmedArticleSet>")
            .unwrap()
            .is_empty());
        assert!(parse_article_set("<PubmedArticleSet/>").unwrap().is_empty());
    }

    #[test]
    fn test_non_article_elements_are_ignored() {
        let xml = article_set(&[
            "<PubmedBookArticle><BookDocument><PMID>5</PMID></BookDocument></PubmedBookArticle>",
            ARTICLE_111,
        ]);
        let articles = parse_article_set(&xml).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "111");
    }

    #[test]
    fn test_wrong_root_is_fatal() {
        let result = parse_article_set("<eSearchResult><IdList/></eSearchResult>");
        assert!(matches!(result, Err(ParseError::UnexpectedRoot(root)) if root == "eSearchResult"));
    }

    #[test]
    fn test_non_xml_is_fatal() {
        assert!(matches!(
            parse_article_set("{\"error\": \"bad request\"}"),
            Err(ParseError::MissingRoot)
        ));
        assert!(matches!(parse_article_set(""), Err(ParseError::MissingRoot)));
    }

    #[test]
    fn test_content_after_root_is_fatal() {
        let second_root = "<PubmedArticleSet></PubmedArticleSet><html><body>oops</body></html>";
        assert!(matches!(
            parse_article_set(second_root),
            Err(ParseError::TrailingContent(found)) if found == "<html>"
        ));

        let stray_text = "<PubmedArticleSet></PubmedArticleSet>garbage text";
        assert!(matches!(
            parse_article_set(stray_text),
            Err(ParseError::TrailingContent(found)) if found == "garbage text"
        ));

        let after_empty_root = "<PubmedArticleSet/><PubmedArticleSet/>";
        assert!(matches!(
            parse_article_set(after_empty_root),
            Err(ParseError::TrailingContent(_))
        ));
    }

    #[test]
    fn test_trailing_whitespace_and_comments_are_accepted() {
        let xml = format!("{}\n  <!-- served by efetch -->\n", article_set(&[ARTICLE_111]));
        assert_eq!(parse_article_set(&xml).unwrap().len(), 1);
    }

    #[test]
    fn test_mismatched_tags_are_fatal() {
        let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation></PubmedArticle></PubmedArticleSet>";
        assert!(matches!(parse_article_set(xml), Err(ParseError::Xml(_))));
    }
}
