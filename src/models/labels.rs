/// Dish classes of the bundled food classifier, in output-index order.
pub const DEFAULT_CLASS_NAMES: [&str; 124] = [
    "achar", "aloo gobi", "aloo matar", "aloo methi", "aloo puri", "aloo tikki",
    "appam", "apple", "apple pie", "bagels", "baingan bharta", "banana", "basundi",
    "beetroot", "besan cheela", "besan laddu", "bhindi masala", "biryani", "boondi",
    "butter chicken", "cabbage", "canned potatoes", "capsicum", "carrots",
    "cauliflower", "chai", "chana masala", "chapati", "chicken rezala",
    "chicken tikka", "chicken tikka masala", "chilli pepper", "chilli potato",
    "chole bhature", "chop suey", "chow mein", "cooked oatmeal", "cooked pasta",
    "corn", "cucumber", "dal makhani", "dal tadka", "dhokla", "doughnut", "dum aloo",
    "fried chicken", "fried rice", "gajar ka halwa", "garlic", "ginger",
    "gobi manchurian", "grape", "gujiya", "idli", "imarti", "jalebi", "kachori",
    "kadai paneer", "kadhi pakoda", "kaju katli", "kalakand", "kathi roll", "kebabs",
    "khandvi", "khichdi", "kiwi", "kofta", "kulfi", "lassi", "lemon", "lettuce",
    "litti chokha", "malpua", "masala dosa", "medu vada", "mishti doi", "missi roti",
    "modak", "momos", "mysore pak", "naan bread", "navratan korma", "omelette",
    "onion", "onion pakoda", "orange", "palak paneer", "paneer butter masala", "papad",
    "paratha", "pav bhaji", "peanut chikki", "pear", "peas", "phirni", "pineapple",
    "poha", "popcorn", "rabri", "rajma", "ras malai", "rasgulla", "rice cooked",
    "samosa", "sandwich", "scrambled eggs", "shankarpali", "sheer khurma", "sheera",
    "shelled soy bean", "shrikhand", "spinach", "spring rolls", "sprouts",
    "stuffed karela", "sunny side up eggs", "sweet potatoes", "taco", "toast",
    "tomato", "turnip", "uttapam", "vada pav", "watermelon",
];

/// Ordered dish names; position `i` is the label of model output `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLabelSet {
    labels: Vec<String>,
}

impl ClassLabelSet {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl Default for ClassLabelSet {
    fn default() -> Self {
        Self::new(DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect())
    }
}
