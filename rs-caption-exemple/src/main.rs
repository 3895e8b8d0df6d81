use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_caption_core::io::{build_output_path, load_choice_log, load_choices, read_templates, save_choice_log, save_choices};
use rs_caption_core::{
    AttributeValue, Attributes, Bins2dWriter, BinsWriter, ChoiceLog, Composer, ContinuousAngleWriter, OptionsWriter,
    QuantizedWriter, Variant, Writer, article_agreement,
};

const DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

/// Writers for the "simple shapes" dataset.
fn writers() -> BTreeMap<String, Vec<Writer>> {
    let shape = OptionsWriter::new()
        .with_option("0", ["square", "box"])
        .with_option("1", ["circle", "disc"])
        .with_option("2", ["triangle", "three-sided shape"]);

    let color = QuantizedWriter::new(
        vec![
            vec![255.0, 0.0, 0.0],
            vec![0.0, 128.0, 0.0],
            vec![0.0, 0.0, 255.0],
            vec![106.0, 90.0, 205.0],
            vec![255.0, 165.0, 0.0],
            vec![128.0, 128.0, 128.0],
        ],
        ["red", "green", "blue", "slate blue", "orange", "grey"],
    );

    // Sizes are in pixels on a 32x32 canvas.
    let size = BinsWriter::new(vec![10.0, 25.0], [vec!["small", "tiny"], vec!["medium"], vec!["big", "large"]]);

    let location = Writer::from(Bins2dWriter::new(
        [vec![11.0, 21.0], vec![11.0, 21.0]],
        vec![
            vec!["{prefix}upper left", "{prefix}left", "{prefix}lower left"],
            vec!["{prefix}top", "center", "{prefix}bottom"],
            vec!["{prefix}upper right", "{prefix}right", "{prefix}lower right"],
        ],
    ))
    .with_variant("prefix", ["", "very "]);

    let rotation = vec![
        Writer::from(ContinuousAngleWriter::new()).with_caption("rotated {val} degrees"),
        Writer::from(ContinuousAngleWriter::new())
            .with_caption("rotated {val} degrees {way}")
            .with_variant("way", ["clockwise", "counterclockwise"]),
    ];

    BTreeMap::from([
        ("shape".to_owned(), vec![shape.into()]),
        ("color".to_owned(), vec![color.into()]),
        ("size".to_owned(), vec![size.into()]),
        ("location".to_owned(), vec![location]),
        ("rotation".to_owned(), rotation),
    ])
}

fn composer(templates: Vec<String>) -> Result<Composer, Box<dyn std::error::Error>> {
    // "{n?}" becomes "n" in front of a vowel: "A big ..." / "An orange ..."
    let start: Vec<Variant> = ["A", "It is a", "This is a", "There is a", "The image contains a"]
        .into_iter()
        .map(|s| article_agreement(format!("{s}{{n?}}")))
        .chain([Variant::from("A kind of")])
        .collect();

    Ok(Composer::new(templates, writers())?
        .with_variant("start", start)
        .with_variant("colorBefore", ["{color}", "{color} colored"])
        .with_variant("located", ["", "located "])
        .with_variant("in_the", ["in the", "at the"])
        .with_variant("link", [". It is", ", and is"])
        .with_variant("is?", ["", "is "]))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let data = Path::new(DATA_DIR);

    // Templates: one per line. Groups "<...>" are randomly permuted.
    let templates = read_templates(data.join("templates.txt"))?;
    let composer = composer(templates)?;

    let attributes: Attributes = BTreeMap::from([
        ("shape".to_owned(), AttributeValue::from(2)),
        ("rotation".to_owned(), AttributeValue::from(PI / 6.0)),
        ("color".to_owned(), AttributeValue::from((129.0, 76.0, 200.0))),
        ("size".to_owned(), AttributeValue::from(20)),
        ("location".to_owned(), AttributeValue::from((29.0, 8.0))),
    ]);

    // A partially recorded set of choices: recorded decisions are kept,
    // the others are drawn at the first call and then stay fixed.
    let mut choices = load_choices(data.join("choices.json"))?;
    for _ in 0..5 {
        let (sentence, recorded) = composer.compose(&attributes, Some(choices))?;
        println!("{sentence}");
        choices = recorded;
    }
    println!("{}", choices.to_json()?);

    // Seeded generation: the same seed gives the same captions.
    let seed = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<u64>()?,
        None => 42,
    };
    let mut rng = StdRng::seed_from_u64(seed);
    let mut log = ChoiceLog::new();
    for i in 0..10 {
        let (sentence, recorded) = composer.compose_with_rng(&attributes, None, &mut rng)?;
        println!("Generated caption {}: {}", i + 1, sentence);
        log.push(recorded);
    }

    // Every caption can be regenerated later from its attributes and record.
    let output_dir = match std::env::args().nth(2) {
        Some(arg) => PathBuf::from(arg),
        None => std::env::temp_dir().join("rs-caption"),
    };
    std::fs::create_dir_all(&output_dir)?;
    let output = output_dir.join("generated.json");
    save_choices(&output, &choices)?;
    let log_path = build_output_path(&output, "bin")?;
    save_choice_log(&log_path, &log)?;
    info!("saved {} choice records to {}", log.len(), log_path.display());

    for (i, recorded) in load_choice_log(&log_path)?.iter().enumerate() {
        let (sentence, _) = composer.compose(&attributes, Some(recorded.clone()))?;
        println!("Replayed caption {}: {}", i + 1, sentence);
    }

    Ok(())
}
