use super::args::IndexArgs;
use super::command::{parse_command, Command, HELP};
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::trie::Completion;

use glob::glob;
use serde_json::{json, Value};
use simple_log::{error, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Added { word: String, frequency: u64 },
    Learned(usize),
    Forgotten(usize),
    Deleted { word: String, removed: bool },
    Contains { word: String, found: bool },
    Frequency { word: String, frequency: u64 },
    Weight { prefix: String, weight: u64 },
    Completions(Vec<Completion>),
    Stats { words: usize, nodes: usize, weight: u64 },
    Help,
}

impl Response {
    pub fn to_json(&self) -> Value {
        match self {
            Response::Added { word, frequency } => json!({"word": word, "frequency": frequency}),
            Response::Learned(count) => json!({"learned": count}),
            Response::Forgotten(count) => json!({"forgotten": count}),
            Response::Deleted { word, removed } => json!({"word": word, "removed": removed}),
            Response::Contains { word, found } => json!({"word": word, "found": found}),
            Response::Frequency { word, frequency } => {
                json!({"word": word, "frequency": frequency})
            }
            Response::Weight { prefix, weight } => json!({"prefix": prefix, "weight": weight}),
            Response::Completions(completions) => Value::Array(
                completions
                    .iter()
                    .map(|c| json!({"word": c.word, "frequency": c.frequency}))
                    .collect(),
            ),
            Response::Stats {
                words,
                nodes,
                weight,
            } => json!({"words": words, "nodes": nodes, "weight": weight}),
            Response::Help => json!({"help": HELP}),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Response::Added { word, frequency } => format!("{} = {}", word, frequency),
            Response::Learned(count) => format!("learned {} tokens", count),
            Response::Forgotten(count) => format!("forgot {} words", count),
            Response::Deleted { word, removed } => {
                if *removed {
                    format!("deleted {}", word)
                } else {
                    format!("{} not found", word)
                }
            }
            Response::Contains { found, .. } => found.to_string(),
            Response::Frequency { frequency, .. } => frequency.to_string(),
            Response::Weight { weight, .. } => weight.to_string(),
            Response::Completions(completions) => {
                if completions.is_empty() {
                    return "no matches".to_string();
                }
                completions
                    .iter()
                    .map(|c| format!("{}\t{}", c.word, c.frequency))
                    .collect::<Vec<String>>()
                    .join("\n")
            }
            Response::Stats {
                words,
                nodes,
                weight,
            } => format!("words={} nodes={} weight={}", words, nodes, weight),
            Response::Help => HELP.to_string(),
        }
    }

    pub fn render(&self, as_json: bool) -> String {
        if as_json {
            self.to_json().to_string()
        } else {
            self.to_text()
        }
    }
}

/// Owns the dictionary for one session.
///
/// Every command takes the lock once for its whole duration: lookups share a
/// read guard, mutations hold the write guard until the index is consistent
/// again.
#[derive(Debug)]
pub struct Backend {
    dictionary: RwLock<Dictionary>,
    args: IndexArgs,
}

impl Backend {
    pub fn new(args: IndexArgs) -> Self {
        Self {
            dictionary: RwLock::new(Dictionary::new(args.min_word_len)),
            args,
        }
    }

    pub fn args(&self) -> &IndexArgs {
        &self.args
    }

    /// Learns every file matched by the `--corpus` globs. Unreadable files
    /// are logged and skipped.
    pub async fn load_corpus(&self) -> Result<usize> {
        let mut total = 0;
        for pattern in self.args.corpus.iter() {
            for entry in glob(pattern)? {
                match entry {
                    Ok(path) => match tokio::fs::read_to_string(&path).await {
                        Ok(content) => {
                            let added = self.add_words(&content).await?;
                            info!("learned {} tokens from {}", added, path.display());
                            total += added;
                        }
                        Err(e) => {
                            error!("fail to read {}: {}", path.display(), e);
                        }
                    },
                    Err(e) => {
                        error!("{:?}", e);
                    }
                }
            }
        }
        Ok(total)
    }

    pub async fn add_words(&self, content: &str) -> Result<usize> {
        let mut dictionary = self.dictionary.write().await;
        dictionary.add_text(content)
    }

    pub async fn remove_words(&self, content: &str) -> usize {
        let mut dictionary = self.dictionary.write().await;
        dictionary.remove_text(content)
    }

    pub async fn execute(&self, command: Command) -> Result<Response> {
        let response = match command {
            Command::Add { word, frequency } => {
                let mut dictionary = self.dictionary.write().await;
                dictionary.add_word(&word, frequency)?;
                let frequency = dictionary.frequency(&word);
                Response::Added { word, frequency }
            }
            Command::Learn(text) => Response::Learned(self.add_words(&text).await?),
            Command::Forget(text) => Response::Forgotten(self.remove_words(&text).await),
            Command::Delete(word) => {
                let removed = self.dictionary.write().await.remove_word(&word);
                if removed {
                    info!("deleted {:?}", word);
                }
                Response::Deleted { word, removed }
            }
            Command::Contains(word) => {
                let found = self.dictionary.read().await.contains(&word);
                Response::Contains { word, found }
            }
            Command::Frequency(word) => {
                let frequency = self.dictionary.read().await.frequency(&word);
                Response::Frequency { word, frequency }
            }
            Command::Weight(prefix) => {
                let weight = self.dictionary.read().await.prefix_weight(&prefix);
                Response::Weight { prefix, weight }
            }
            Command::Complete { prefix, limit } => {
                let limit = limit.unwrap_or(self.args.limit);
                let dictionary = self.dictionary.read().await;
                Response::Completions(dictionary.autocomplete(&prefix, Some(limit)))
            }
            Command::Stats => {
                let dictionary = self.dictionary.read().await;
                let index = dictionary.index();
                Response::Stats {
                    words: index.len(),
                    nodes: index.node_count(),
                    weight: index.total_weight(),
                }
            }
            Command::Help => Response::Help,
        };
        Ok(response)
    }

    pub async fn handle_line(&self, raw: &[u8]) -> Result<Response> {
        let line = String::from_utf8(raw.to_vec())?;
        self.execute(parse_command(&line)?).await
    }

    /// Answers one command per input line until `reader` is exhausted. A bad
    /// line is logged and reported on stderr; the loop carries on with the next.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let as_json = self.args.json;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            if buf.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }
            match self.handle_line(&buf).await {
                Ok(response) => {
                    writer
                        .write_all(format!("{}\n", response.render(as_json)).as_bytes())
                        .await?;
                }
                Err(e) => {
                    error!("{:?}: {}", String::from_utf8_lossy(&buf).trim_end(), e);
                    eprintln!("error: {}", e);
                }
            }
            writer.flush().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::IndexError;
    use clap::Parser;
    use std::fs;

    fn backend(extra: &[&str]) -> Backend {
        let mut argv = vec!["prefix-index"];
        argv.extend_from_slice(extra);
        Backend::new(IndexArgs::parse_from(argv))
    }

    async fn run(backend: &Backend, line: &str) -> Response {
        backend.execute(parse_command(line).unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_and_complete() {
        let backend = backend(&[]);
        run(&backend, "add app 30").await;
        run(&backend, "add apple 50").await;
        run(&backend, "add application 20").await;

        assert_eq!(
            Response::Completions(vec![
                Completion::new("apple", 50),
                Completion::new("app", 30),
                Completion::new("application", 20),
            ]),
            run(&backend, "complete app").await
        );
        assert_eq!(
            Response::Completions(vec![Completion::new("apple", 50)]),
            run(&backend, "complete app 1").await
        );
        assert_eq!(
            Response::Weight {
                prefix: "appl".to_string(),
                weight: 70
            },
            run(&backend, "weight appl").await
        );
    }

    #[tokio::test]
    async fn test_default_limit() {
        let backend = backend(&["--limit", "2"]);
        run(&backend, "learn a ab abc abcd").await;

        match run(&backend, "complete a").await {
            Response::Completions(completions) => assert_eq!(2, completions.len()),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_keeps_siblings() {
        let backend = backend(&[]);
        run(&backend, "learn car card care").await;

        assert_eq!(
            Response::Deleted {
                word: "car".to_string(),
                removed: true
            },
            run(&backend, "del car").await
        );
        assert_eq!(
            Response::Contains {
                word: "card".to_string(),
                found: true
            },
            run(&backend, "has card").await
        );
        assert_eq!(
            Response::Deleted {
                word: "car".to_string(),
                removed: false
            },
            run(&backend, "del car").await
        );
        assert_eq!(
            Response::Stats {
                words: 2,
                nodes: 6,
                weight: 2
            },
            run(&backend, "stats").await
        );
    }

    #[tokio::test]
    async fn test_add_zero_is_rejected() {
        let backend = backend(&[]);
        let err = backend
            .execute(Command::Add {
                word: "app".to_string(),
                frequency: 0,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, IndexError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_load_corpus() {
        let dir = std::env::temp_dir().join(format!("prefix-index-corpus-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.txt"), "apple apple app").unwrap();
        fs::write(dir.join("b.txt"), "banana apple").unwrap();
        fs::write(dir.join("c.md"), "ignored").unwrap();

        let pattern = format!("{}/*.txt", dir.display());
        let backend = backend(&["--corpus", pattern.as_str()]);
        let loaded = backend.load_corpus().await.unwrap();

        assert_eq!(5, loaded);
        assert_eq!(
            Response::Frequency {
                word: "apple".to_string(),
                frequency: 3
            },
            run(&backend, "freq apple").await
        );
        assert_eq!(
            Response::Contains {
                word: "ignored".to_string(),
                found: false
            },
            run(&backend, "has ignored").await
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_handle_line_rejects_invalid_utf8() {
        let backend = backend(&[]);
        run(&backend, "add apple 3").await;

        let err = backend.handle_line(b"\xff\xfe\n").await.unwrap_err();
        assert!(matches!(err, IndexError::Encoding(_)));
        assert_eq!(
            Response::Contains {
                word: "apple".to_string(),
                found: true
            },
            backend.handle_line(b"has apple\n").await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_serve_keeps_going_after_bad_lines() {
        let backend = backend(&[]);
        let input: &[u8] = b"add apple 3\n\xff\xfe\nexplode\n\n  \nhas apple\nfreq apple";
        let mut output = Vec::new();

        backend.serve(input, &mut output).await.unwrap();

        assert_eq!("apple = 3\ntrue\n3\n", String::from_utf8(output).unwrap());
    }

    #[test]
    fn test_render() {
        let response = Response::Completions(vec![
            Completion::new("apple", 50),
            Completion::new("app", 30),
        ]);

        assert_eq!("apple\t50\napp\t30", response.render(false));
        assert_eq!(
            r#"[{"frequency":50,"word":"apple"},{"frequency":30,"word":"app"}]"#,
            response.render(true)
        );
        assert_eq!("no matches", Response::Completions(Vec::new()).render(false));
    }
}
