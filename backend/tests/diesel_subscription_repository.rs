//! Integration tests for `DieselSubscriptionRepository` against embedded
//! PostgreSQL.
//!
//! The fan-out reads subscribers through a LEFT JOIN onto `users`; these
//! tests pin the ordering and the handling of missing addresses against a
//! real database. Set `SKIP_TEST_CLUSTER=1` where PostgreSQL cannot start.

use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use spotting::domain::ports::{AnimalRepository, SubscriptionRepository, UserRepository};
use spotting::domain::{
    Animal, AnimalName, EmailAddress, Login, NewAnimal, NewSubscription, NewUser, Subscriber,
    Subscription, User, UserId,
};
use spotting::outbound::persistence::{
    DbPool, DieselAnimalRepository, DieselSubscriptionRepository, DieselUserRepository,
    PoolConfig,
};
use tokio::runtime::Runtime;

mod support;

use support::{handle_cluster_setup_failure, provision_migrated_database, shared_cluster};

struct DieselWorld {
    runtime: Runtime,
    users: DieselUserRepository,
    animals: DieselAnimalRepository,
    subscriptions: DieselSubscriptionRepository,
    _database: TemporaryDatabase,
}

impl DieselWorld {
    fn user(&self, login: &str, email: Option<&str>) -> User {
        let user = NewUser::new(
            Login::new(login).expect("login"),
            email.map(|raw| EmailAddress::new(raw).expect("email")),
        );
        self.runtime
            .block_on(self.users.create(&user))
            .expect("user stored")
    }

    fn animal(&self, name: &str) -> Animal {
        let animal = NewAnimal::new(AnimalName::new(name).expect("name"), None);
        self.runtime
            .block_on(self.animals.create(&animal))
            .expect("animal stored")
    }

    fn subscribe(
        &self,
        user_id: UserId,
        animal: &Animal,
        description: Option<&str>,
    ) -> Subscription {
        let subscription =
            NewSubscription::new(user_id, animal.id(), description.map(str::to_owned));
        self.runtime
            .block_on(self.subscriptions.create(&subscription))
            .expect("subscription stored")
    }

    fn subscribers(&self, animal: &Animal) -> Vec<Subscriber> {
        self.runtime
            .block_on(self.subscriptions.subscribers_for_animal(animal.id()))
            .expect("subscribers query")
    }
}

fn setup_world() -> Result<DieselWorld, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_migrated_database(cluster, &runtime)?;
    let config = PoolConfig::new(database.url().to_string())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(DieselWorld {
        runtime,
        users: DieselUserRepository::new(pool.clone()),
        animals: DieselAnimalRepository::new(pool.clone()),
        subscriptions: DieselSubscriptionRepository::new(pool),
        _database: database,
    })
}

#[fixture]
fn diesel_world() -> Option<DieselWorld> {
    match setup_world() {
        Ok(world) => Some(world),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn subscribers_come_back_in_subscription_order(diesel_world: Option<DieselWorld>) {
    let Some(world) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: subscribers_come_back_in_subscription_order skipped");
        return;
    };
    let ada = world.user("ada", Some("ada@example.org"));
    let bob = world.user("bob", Some("bob@example.org"));
    let lynx = world.animal("Lynx");
    let wolf = world.animal("Wolf");

    let first = world.subscribe(bob.id(), &lynx, Some("near the ridge"));
    world.subscribe(ada.id(), &wolf, None);
    let third = world.subscribe(ada.id(), &lynx, None);

    let subscribers = world.subscribers(&lynx);

    let ids: Vec<_> = subscribers.iter().map(|s| s.subscription_id).collect();
    assert_eq!(ids, vec![first.id(), third.id()]);
    assert_eq!(subscribers[0].user_id, bob.id());
    assert_eq!(subscribers[0].description.as_deref(), Some("near the ridge"));
    assert_eq!(subscribers[1].email, ada.email().cloned());
}

#[rstest]
fn user_without_email_yields_no_address(diesel_world: Option<DieselWorld>) {
    let Some(world) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: user_without_email_yields_no_address skipped");
        return;
    };
    let carol = world.user("carol", None);
    let lynx = world.animal("Lynx");
    let subscription = world.subscribe(carol.id(), &lynx, None);

    let subscribers = world.subscribers(&lynx);

    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].subscription_id, subscription.id());
    assert_eq!(subscribers[0].user_id, carol.id());
    assert!(subscribers[0].email.is_none());
}

#[rstest]
fn subscription_of_missing_user_still_yields_a_subscriber(diesel_world: Option<DieselWorld>) {
    let Some(world) = diesel_world else {
        eprintln!(
            "SKIP-TEST-CLUSTER: subscription_of_missing_user_still_yields_a_subscriber skipped"
        );
        return;
    };
    let lynx = world.animal("Lynx");
    let ghost = UserId::new(9_999).expect("user id");
    let subscription = world.subscribe(ghost, &lynx, None);

    let subscribers = world.subscribers(&lynx);

    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].subscription_id, subscription.id());
    assert_eq!(subscribers[0].user_id, ghost);
    assert!(subscribers[0].email.is_none());
}

#[rstest]
fn deleted_subscription_is_not_returned(diesel_world: Option<DieselWorld>) {
    let Some(world) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: deleted_subscription_is_not_returned skipped");
        return;
    };
    let ada = world.user("ada", Some("ada@example.org"));
    let lynx = world.animal("Lynx");
    let subscription = world.subscribe(ada.id(), &lynx, None);

    let removed = world
        .runtime
        .block_on(world.subscriptions.delete(subscription.id()))
        .expect("delete");

    assert!(removed);
    assert!(world.subscribers(&lynx).is_empty());
}
