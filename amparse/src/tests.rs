//! コーパスからデコードまでを通して検証するテストモジュール。

use std::sync::Arc;

use crate::config::{ChildrenOrder, ParserConfig, TransitionVariant};
use crate::corpus::Corpus;
use crate::errors::OracleError;
use crate::lexicon::AdditionalLexicon;
use crate::parser::{OneHotReplay, Parser};

fn test_lexicon() -> Arc<AdditionalLexicon> {
    Arc::new(
        AdditionalLexicon::from_readers(
            "APP_s\nAPP_o\nMOD_m\n".as_bytes(),
            "(s)\n()\n(o)\n".as_bytes(),
        )
        .unwrap(),
    )
}

const CORPUS: &str = "\
1\tthe\t_\t2\tMOD_m
2\tcat\t(s)\t3\tAPP_s
3\tchases\t()\t0\tROOT
4\ta\t_\t5\tMOD_m
5\tmouse\t(o)\t3\tAPP_o
EOS
1\train\t()\t0\tROOT
EOS
";

#[test]
fn test_corpus_to_decode_pipeline() {
    let lexicon = test_lexicon();
    for variant in [TransitionVariant::Dfs, TransitionVariant::DfsChildrenFirst] {
        for pop_with_0 in [false, true] {
            let config = ParserConfig::new(variant)
                .children_order(ChildrenOrder::IO)
                .pop_with_0(pop_with_0);
            let parser = Parser::new(lexicon.clone(), config);
            let mut worker = parser.new_worker();

            let mut corpus = Corpus::from_reader(CORPUS.as_bytes()).unwrap();
            for example in corpus.iter_mut() {
                let actions = parser.system().oracle(example.graph()).unwrap();
                let codec = parser.codec_for(example.graph().len());
                example.set_actions(codec.encode_actions(&actions).unwrap());
            }

            // Serialize the annotated corpus and read it back, as the
            // oracle and parse commands do across a file boundary.
            let mut buf = vec![];
            corpus.write(&mut buf).unwrap();
            let reloaded = Corpus::from_reader(buf.as_slice()).unwrap();
            assert_eq!(reloaded.len(), corpus.len());

            for (example, original) in reloaded.iter().zip(corpus.iter()) {
                let ids = example.actions().unwrap();
                worker.reset_nodes(example.graph().nodes());
                worker.decode(&mut OneHotReplay::new(ids.to_vec()));
                assert_eq!(worker.retrieve_parse(), *original.graph());
            }
        }
    }
}

#[test]
fn test_unknown_label_skips_only_the_offending_example() {
    let lexicon = test_lexicon();
    let parser = Parser::new(lexicon, ParserConfig::new(TransitionVariant::Dfs));

    let corpus_data = "\
1\ta\t_\t0\tROOT
2\tb\t_\t1\tX-NOT-IN-LEXICON
EOS
1\tc\t_\t0\tROOT
EOS
";
    let corpus = Corpus::from_reader(corpus_data.as_bytes()).unwrap();

    let results: Vec<_> = corpus
        .iter()
        .map(|example| parser.system().oracle(example.graph()))
        .collect();

    assert!(matches!(results[0], Err(OracleError::UnknownLabel(_))));
    assert!(results[1].is_ok());
}

#[test]
fn test_decoding_sessions_are_independent() {
    let lexicon = test_lexicon();
    let parser = Parser::new(lexicon, ParserConfig::new(TransitionVariant::Dfs));
    let corpus = Corpus::from_reader(CORPUS.as_bytes()).unwrap();

    // Two workers decode different examples concurrently; the lexicon is
    // the only shared object.
    std::thread::scope(|scope| {
        for example in corpus.iter() {
            let parser = parser.clone();
            scope.spawn(move || {
                let actions = parser.system().oracle(example.graph()).unwrap();
                let codec = parser.codec_for(example.graph().len());
                let ids = codec.encode_actions(&actions).unwrap();
                let mut worker = parser.new_worker();
                worker.reset_nodes(example.graph().nodes());
                worker.decode(&mut OneHotReplay::new(ids));
                assert_eq!(worker.retrieve_parse(), *example.graph());
            });
        }
    });
}
