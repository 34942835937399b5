//! Terminal front end for the quiz services.

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use quiz_core::model::{ExamSpec, Question};
use services::sessions::{HistoryRow, format_clock, format_percent};
use services::{AppServices, LoopStep, QuizSession, SessionResult};

pub const REGISTRATION_URL: &str = "https://www.cfainstitute.org/";

pub fn categories(services: &AppServices) {
    report_load(services);
    println!("{:<40} {:>7} {:>5} {:>7} {:>5}", "Category", "Weight", "Easy", "Medium", "Hard");
    for count in services.bank().category_counts() {
        println!(
            "{:<40} {:>7} {:>5} {:>7} {:>5}",
            count.category.name(),
            format_percent(count.category.weight()),
            count.easy,
            count.medium,
            count.hard
        );
        println!("    {}", count.category.description());
    }
    println!();
    println!("{} questions indexed.", services.bank().index().len());
}

/// Run one exam interactively, reading option numbers from stdin.
///
/// End of input abandons the exam without recording it.
///
/// # Errors
///
/// Returns an error if the exam cannot be composed or stdin cannot be read.
pub async fn quiz(
    services: &mut AppServices,
    spec: ExamSpec,
) -> Result<(), Box<dyn std::error::Error>> {
    report_load(services);
    let quiz_loop = services.quiz_loop();
    let mut session = quiz_loop.start_exam(spec)?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("{} ({} questions)", session.label(), session.total());

    loop {
        let Some(question) = session.current_question() else {
            break;
        };
        print_question(&session, question);

        let Some(choice) = read_choice(&mut input, question).await? else {
            println!();
            println!("Exam abandoned; nothing recorded.");
            return Ok(());
        };

        let feedback = quiz_loop.submit(&mut session, &choice)?;
        if feedback.is_correct() {
            println!("Correct!");
        } else {
            println!("Incorrect. The answer is: {}", feedback.correct_answer);
        }
        if let Some(explanation) = &feedback.explanation {
            println!("{explanation}");
        }

        match quiz_loop.advance(&mut session, services.progress_mut()).await? {
            LoopStep::Next => {}
            LoopStep::Completed { result, recorded } => {
                print_result(&result);
                match recorded.persisted {
                    Ok(()) => println!("Saved as attempt {}.", recorded.entry.attempt()),
                    Err(err) => eprintln!("warning: {err}; this attempt was not saved"),
                }
                break;
            }
        }
    }
    Ok(())
}

pub fn progress(services: &AppServices) {
    let stats = services.progress().stats();
    if stats.attempts == 0 {
        println!("No exams completed yet.");
        return;
    }

    println!("Attempts:        {}", stats.attempts);
    if let Some(avg) = stats.average_score {
        println!("Average score:   {}", format_percent(avg));
    }
    if let Some(best) = stats.best_score {
        println!("Best score:      {}", format_percent(best));
    }
    println!("Study time:      {:.1} min", stats.total_study_minutes);
    if let Some(last) = stats.last_date {
        println!("Last exam:       {last}");
    }

    println!();
    println!("{:>7}  {:<10}  {:>5}  {:>6}", "Attempt", "Date", "Score", "Time");
    for entry in services.progress().ledger().entries() {
        let row = HistoryRow::from_entry(entry);
        println!(
            "{:>7}  {:<10}  {:>5}  {:>6}",
            row.attempt, row.date, row.score, row.time_spent
        );
    }
}

pub async fn register(services: &mut AppServices) {
    let click = services.progress_mut().record_registration_click().await;
    if let Err(err) = click.persisted {
        eprintln!("warning: {err}");
    }
    println!("Register for the CFA exam at {REGISTRATION_URL}");
}

fn report_load(services: &AppServices) {
    let report = services.load_report();
    if let Some(warning) = &report.warning {
        eprintln!("warning: {warning}; no questions available");
    } else if report.dropped() > 0 {
        eprintln!("note: {} question records were skipped", report.dropped());
    }
}

fn print_question(session: &QuizSession, question: &Question) {
    println!();
    println!(
        "Question {}/{}  [{} | {}]  score {}",
        session.index() + 1,
        session.total(),
        question.category().name(),
        question.difficulty().title(),
        session.score()
    );
    println!("{}", question.text());
    for (n, option) in question.options().iter().enumerate() {
        println!("  {}. {option}", n + 1);
    }
}

/// Prompt until a valid option number is entered; `None` on end of input.
async fn read_choice(
    input: &mut Lines<BufReader<Stdin>>,
    question: &Question,
) -> std::io::Result<Option<String>> {
    let options = question.options();
    loop {
        println!("Your answer (1-{}):", options.len());
        let Some(line) = input.next_line().await? else {
            return Ok(None);
        };
        let picked = line
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i));
        match picked {
            Some(option) => return Ok(Some(option.clone())),
            None => println!("Enter a number between 1 and {}.", options.len()),
        }
    }
}

fn print_result(result: &SessionResult) {
    println!();
    println!("== {} complete ==", result.label);
    println!(
        "Score:            {}/{} ({})",
        result.correct,
        result.total,
        format_percent(result.score)
    );
    println!("Total time:       {}", format_clock(result.total_secs));
    println!("Per question:     {}", format_clock(result.average_secs));
}
