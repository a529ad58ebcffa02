use std::sync::Mutex;

use dic::{Container, GlobalInstances, Shared, TypeDescriptor, registry};
use tracing::info;

#[derive(Debug)]
struct Settings {
    greeting: Mutex<String>,
}

#[derive(Debug)]
struct Greeter {
    settings: Shared<Settings>,
}

impl Greeter {
    fn greet(&self, name: &str) -> String {
        format!("{}, {}!", self.settings.greeting.lock().unwrap(), name)
    }
}

#[derive(Debug)]
struct Front {
    greeter: Shared<Greeter>,
    container: Container,
}

fn main() -> Result<(), dic::Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let registry = registry![
        TypeDescriptor::of::<Settings>()
            .single_instance()
            .constructor(|_| Ok(Settings {
                greeting: Mutex::new("Hello".to_string()),
            })),
        TypeDescriptor::of::<Greeter>()
            .param::<Settings>()
            .constructor(|args| Ok(Greeter {
                settings: args.next()?,
            })),
        TypeDescriptor::of::<Front>()
            .param::<Greeter>()
            .param::<Container>()
            .constructor(|args| Ok(Front {
                greeter: args.next()?,
                container: args.next_container()?,
            })),
    ]?;

    let container = Container::init_shared(registry)?;

    let front = container.get::<Front>()?;
    info!("{}", front.greeter.greet("world"));

    *container.get::<Settings>()?.greeting.lock().unwrap() = "Welcome back".to_string();
    info!("{}", front.greeter.greet("world"));

    let globals = front.container.get::<GlobalInstances>()?;
    let first = globals.global::<Greeter>()?;
    let second = globals.global::<Greeter>()?;
    info!("global greeter shared: {}", Shared::ptr_eq(&first, &second));

    let quiet = Container::shared().with_override_rule(dic::type_key::<Settings>(), |_| {
        Ok(Some(dic::into_instance(Settings {
            greeting: Mutex::new("Psst".to_string()),
        })))
    });
    info!("{}", quiet.get::<Greeter>()?.greet("world"));

    println!("Container: {:?}", container);

    Ok(())
}
